//! Email and password sign-in.

use dioxus::prelude::*;
use store::SignInDraft;
use ui::components::{Button, ButtonVariant, Input, Label};
use ui::{push_toast, use_hub, use_session, use_toasts, ToastLevel};

use crate::Route;

#[component]
pub fn Login() -> Element {
    let hub = use_hub();
    let session = use_session();
    let mut toasts = use_toasts();
    let nav = use_navigator();

    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut submitting = use_signal(|| false);

    // Already signed in: nothing to do here.
    use_effect(move || {
        if session().is_signed_in() && !submitting() {
            nav.replace(Route::Home {});
        }
    });

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if submitting() {
            return;
        }
        let draft = SignInDraft {
            email: email(),
            password: password(),
        };
        if let Err(e) = draft.validate() {
            push_toast(&mut toasts, ToastLevel::Error, "Check the form", &e.to_string());
            return;
        }
        let store = hub.store.clone();
        spawn(async move {
            submitting.set(true);
            let result = store.sign_in(&draft.email(), &draft.password).await;
            submitting.set(false);
            match result {
                Ok(()) => {
                    nav.replace(Route::Home {});
                }
                Err(e) => {
                    tracing::error!("Sign in failed: {e}");
                    push_toast(&mut toasts, ToastLevel::Error, "Could not sign in", &e.to_string());
                }
            }
        });
    };

    rsx! {
        div {
            class: "auth-page",
            h1 { class: "page-title", "Welcome back" }
            p { class: "page-subtitle", "Sign in to join and create communities." }

            form {
                class: "auth-form",
                onsubmit: handle_submit,

                div {
                    class: "form-field",
                    Label { r#for: "login-email", "Email" }
                    Input {
                        id: "login-email",
                        r#type: "email",
                        value: email(),
                        placeholder: "you@example.com",
                        oninput: move |evt: FormEvent| email.set(evt.value()),
                    }
                }
                div {
                    class: "form-field",
                    Label { r#for: "login-password", "Password" }
                    Input {
                        id: "login-password",
                        r#type: "password",
                        value: password(),
                        oninput: move |evt: FormEvent| password.set(evt.value()),
                    }
                }
                Button {
                    variant: ButtonVariant::Primary,
                    r#type: "submit",
                    disabled: submitting(),
                    if submitting() { "Signing in..." } else { "Sign in" }
                }
            }

            p {
                class: "auth-page__switch",
                "No account yet? "
                Link { to: Route::SignUp {}, "Sign up" }
            }
        }
    }
}
