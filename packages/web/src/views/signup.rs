//! Account creation with an optional avatar.

use dioxus::prelude::*;
use store::SignUpDraft;
use ui::components::{Button, ButtonVariant, Input, Label};
use ui::{push_toast, use_hub, use_toasts, ImagePicker, PickedImage, ToastLevel};

use crate::Route;

#[component]
pub fn SignUp() -> Element {
    let hub = use_hub();
    let mut toasts = use_toasts();
    let nav = use_navigator();

    let mut full_name = use_signal(String::new);
    let mut username = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut confirm_password = use_signal(String::new);
    let mut avatar = use_signal(|| Option::<PickedImage>::None);
    let mut submitting = use_signal(|| false);

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if submitting() {
            return;
        }
        let hub = hub.clone();
        let draft = SignUpDraft {
            full_name: full_name(),
            username: username(),
            email: email(),
            password: password(),
            confirm_password: confirm_password(),
            avatar: avatar().map(|p| p.file),
        };
        spawn(async move {
            submitting.set(true);
            let result = api::sign_up(hub.backend(), &hub.config.storage, &draft).await;
            submitting.set(false);
            match result {
                Ok(outcome) => {
                    if let Some(e) = outcome.avatar_error {
                        push_toast(
                            &mut toasts,
                            ToastLevel::Info,
                            "Account created without avatar",
                            &e.to_string(),
                        );
                    }
                    push_toast(
                        &mut toasts,
                        ToastLevel::Success,
                        "Account created",
                        "Check your inbox to confirm, then sign in.",
                    );
                    nav.push(Route::Login {});
                }
                Err(e) => {
                    let title = if e.is_validation() { "Check the form" } else { "Could not sign up" };
                    push_toast(&mut toasts, ToastLevel::Error, title, &e.to_string());
                }
            }
        });
    };

    rsx! {
        div {
            class: "auth-page",
            h1 { class: "page-title", "Create your account" }
            p { class: "page-subtitle", "It takes less than a minute." }

            form {
                class: "auth-form",
                onsubmit: handle_submit,

                div {
                    class: "form-field",
                    Label { r#for: "signup-avatar", "Avatar (optional)" }
                    ImagePicker {
                        id: "signup-avatar",
                        label: "Choose an avatar",
                        picked: avatar(),
                        on_pick: move |picked| avatar.set(picked),
                    }
                }
                div {
                    class: "form-field",
                    Label { r#for: "signup-full-name", "Full name" }
                    Input {
                        id: "signup-full-name",
                        value: full_name(),
                        oninput: move |evt: FormEvent| full_name.set(evt.value()),
                    }
                }
                div {
                    class: "form-field",
                    Label { r#for: "signup-username", "Username" }
                    Input {
                        id: "signup-username",
                        value: username(),
                        oninput: move |evt: FormEvent| username.set(evt.value()),
                    }
                }
                div {
                    class: "form-field",
                    Label { r#for: "signup-email", "Email" }
                    Input {
                        id: "signup-email",
                        r#type: "email",
                        value: email(),
                        placeholder: "you@example.com",
                        oninput: move |evt: FormEvent| email.set(evt.value()),
                    }
                }
                div {
                    class: "form-row",
                    div {
                        class: "form-field",
                        Label { r#for: "signup-password", "Password" }
                        Input {
                            id: "signup-password",
                            r#type: "password",
                            value: password(),
                            oninput: move |evt: FormEvent| password.set(evt.value()),
                        }
                    }
                    div {
                        class: "form-field",
                        Label { r#for: "signup-confirm", "Confirm password" }
                        Input {
                            id: "signup-confirm",
                            r#type: "password",
                            value: confirm_password(),
                            oninput: move |evt: FormEvent| confirm_password.set(evt.value()),
                        }
                    }
                }
                Button {
                    variant: ButtonVariant::Primary,
                    r#type: "submit",
                    disabled: submitting(),
                    if submitting() { "Creating account..." } else { "Sign up" }
                }
            }

            p {
                class: "auth-page__switch",
                "Already registered? "
                Link { to: Route::Login {}, "Sign in" }
            }
        }
    }
}
