//! Landing page: hero plus the filterable community directory.

use dioxus::prelude::*;
use ui::{use_session, CommunitiesList, DirectoryProvider, FilterSection, Hero};

use crate::Route;

#[component]
pub fn Home() -> Element {
    let session = use_session();
    let nav = use_navigator();

    rsx! {
        div {
            class: "page page--wide",
            Hero {
                on_create: move |_| {
                    if session().is_signed_in() {
                        nav.push(Route::CreateCommunity {});
                    } else {
                        nav.push(Route::Login {});
                    }
                },
            }
            DirectoryProvider {
                FilterSection {}
                CommunitiesList {
                    on_select: move |id: String| {
                        nav.push(Route::CommunityDetail { id, tab: "about".to_string() });
                    },
                }
            }
        }
    }
}
