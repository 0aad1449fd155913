use dioxus::prelude::*;
use ui::{use_session, CommunityForm};

use crate::Route;

#[component]
pub fn CreateCommunity() -> Element {
    let session = use_session();
    let nav = use_navigator();

    use_effect(move || {
        let state = session();
        if !state.loading && !state.is_signed_in() {
            nav.replace(Route::Login {});
        }
    });

    rsx! {
        div {
            class: "page",
            h1 { class: "page-title", "Create a community" }
            p { class: "page-subtitle", "Give your people a place to gather." }
            CommunityForm {
                on_created: move |community: store::Community| {
                    nav.push(Route::CommunityDetail {
                        id: community.id,
                        tab: "about".to_string(),
                    });
                },
            }
        }
    }
}
