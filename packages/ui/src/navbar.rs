use dioxus::prelude::*;

use crate::icons::FaRightFromBracket;
use crate::profile::ProfileAvatar;
use crate::session::{use_hub, use_session};
use crate::toast::{push_toast, use_toasts, ToastLevel};
use crate::Icon;

#[component]
pub fn Navbar(children: Element) -> Element {
    rsx! {
        header {
            class: "navbar",
            {children}
        }
    }
}

/// Avatar, display name and sign-out for the signed-in user.
///
/// Renders nothing while signed out; the cached profile is shown during the
/// startup check so the name appears on first paint.
#[component]
pub fn UserMenu(on_signed_out: EventHandler<()>, on_profile: EventHandler<()>) -> Element {
    let hub = use_hub();
    let session = use_session();
    let mut toasts = use_toasts();
    let mut busy = use_signal(|| false);
    let state = session();

    let show = state.is_signed_in() || (state.loading && state.profile.is_some());
    if !show {
        return rsx! {};
    }

    let name = state
        .profile
        .as_ref()
        .and_then(|p| p.display_name().map(str::to_string))
        .or_else(|| state.user.as_ref().and_then(|u| u.email.clone()))
        .unwrap_or_default();

    let handle_sign_out = move |_| {
        let store = hub.store.clone();
        spawn(async move {
            busy.set(true);
            match store.sign_out().await {
                Ok(()) => on_signed_out.call(()),
                Err(e) => {
                    tracing::error!("Sign out failed: {e}");
                    push_toast(&mut toasts, ToastLevel::Error, "Could not sign out", &e.to_string());
                }
            }
            busy.set(false);
        });
    };

    rsx! {
        div {
            class: "user-menu",
            button {
                class: "user-menu__profile",
                onclick: move |_| on_profile.call(()),
                ProfileAvatar { profile: state.profile.clone(), size: 28 }
                span { class: "user-menu__name", "{name}" }
            }
            button {
                class: "user-menu__sign-out",
                title: "Sign out",
                disabled: busy() || !state.is_signed_in(),
                onclick: handle_sign_out,
                Icon { icon: FaRightFromBracket, width: 14, height: 14 }
            }
        }
    }
}
