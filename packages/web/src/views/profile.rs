use dioxus::prelude::*;
use ui::{use_session, ProfileAvatar, ProfileForm};

use crate::Route;

/// Profile page. Signed-out visitors are sent to the login page once the
/// startup check has finished.
#[component]
pub fn Profile() -> Element {
    let session = use_session();
    let nav = use_navigator();

    use_effect(move || {
        let state = session();
        if !state.loading && !state.is_signed_in() {
            nav.replace(Route::Login {});
        }
    });

    let state = session();
    let email = state.user.as_ref().and_then(|u| u.email.clone()).unwrap_or_default();

    rsx! {
        div {
            class: "page",
            div {
                class: "detail-header",
                ProfileAvatar { profile: state.profile.clone(), size: 64 }
                div {
                    class: "detail-header__text",
                    h1 { "Your profile" }
                    p { class: "page-subtitle", "{email}" }
                }
            }
            if state.is_signed_in() {
                ProfileForm {}
            } else {
                p { class: "directory-status", "Checking your session..." }
            }
        }
    }
}
