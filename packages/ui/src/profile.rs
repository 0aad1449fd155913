use std::future::Future;

use dioxus::prelude::*;
use store::{Profile, ProfileDraft};

use crate::components::{Button, Input, Label};
use crate::icons::FaUser;
use crate::image_picker::{discard_picked, ImagePicker, PickedImage};
use crate::session::{use_hub, use_session};
use crate::toast::{push_toast, use_toasts, ToastLevel};
use crate::Icon;

/// Round avatar: the stored image, else the first letter of the display
/// name, else a generic user glyph.
#[component]
pub fn ProfileAvatar(profile: Option<Profile>, #[props(default = 32)] size: u32) -> Element {
    let style = format!("width: {size}px; height: {size}px;");
    let avatar_url = profile
        .as_ref()
        .and_then(|p| p.avatar_url.clone())
        .filter(|url| !url.is_empty());
    let initial = profile.as_ref().and_then(Profile::initial);

    rsx! {
        span {
            class: "avatar",
            style: "{style}",
            if let Some(url) = avatar_url {
                img { src: "{url}", alt: "" }
            } else if let Some(letter) = initial {
                span { class: "avatar__initial", "{letter}" }
            } else {
                Icon { icon: FaUser, width: size / 2, height: size / 2 }
            }
        }
    }
}

/// Re-enable the form, then run `refresh` in the background.
fn settle_then_refresh(mut saving: Signal<bool>, refresh: impl Future<Output = ()> + 'static) {
    saving.set(false);
    spawn(refresh);
}

/// Edit full name, username and avatar of the signed-in user.
#[component]
pub fn ProfileForm() -> Element {
    let hub = use_hub();
    let session = use_session();
    let mut toasts = use_toasts();

    let mut full_name = use_signal(String::new);
    let mut username = use_signal(String::new);
    let mut avatar = use_signal(|| Option::<PickedImage>::None);
    let mut saving = use_signal(|| false);
    let mut seeded = use_signal(|| false);

    // Fill the fields once the profile arrives; later edits are the user's.
    use_effect(move || {
        if seeded() {
            return;
        }
        if let Some(profile) = session().profile {
            full_name.set(profile.full_name.unwrap_or_default());
            username.set(profile.username.unwrap_or_default());
            seeded.set(true);
        }
    });

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if saving() {
            return;
        }
        let Some(user_id) = session().user_id().map(str::to_string) else {
            push_toast(&mut toasts, ToastLevel::Error, "Please sign in first", "");
            return;
        };
        let hub = hub.clone();
        let draft = ProfileDraft {
            full_name: full_name(),
            username: username(),
            avatar: avatar().map(|p| p.file),
        };
        spawn(async move {
            saving.set(true);
            let result = api::save_profile(hub.backend(), &hub.config.storage, &user_id, &draft).await;
            match result {
                Ok(_) => {
                    discard_picked(&mut avatar);
                    push_toast(&mut toasts, ToastLevel::Success, "Profile updated", "");
                    let store = hub.store.clone();
                    settle_then_refresh(saving, async move {
                        store.refresh_profile().await;
                    });
                }
                Err(e) => {
                    saving.set(false);
                    push_toast(&mut toasts, ToastLevel::Error, "Could not update profile", &e.to_string());
                }
            }
        });
    };

    let current_avatar = session().profile.and_then(|p| p.avatar_url);

    rsx! {
        form {
            class: "profile-form",
            onsubmit: handle_submit,

            div {
                class: "form-field",
                Label { r#for: "profile-avatar", "Avatar" }
                ImagePicker {
                    id: "profile-avatar",
                    label: "Choose an avatar",
                    picked: avatar(),
                    current_url: current_avatar,
                    on_pick: move |picked| avatar.set(picked),
                }
            }

            div {
                class: "form-field",
                Label { r#for: "profile-full-name", "Full name" }
                Input {
                    id: "profile-full-name",
                    value: full_name(),
                    oninput: move |evt: FormEvent| full_name.set(evt.value()),
                }
            }

            div {
                class: "form-field",
                Label { r#for: "profile-username", "Username" }
                Input {
                    id: "profile-username",
                    value: username(),
                    oninput: move |evt: FormEvent| username.set(evt.value()),
                }
            }

            Button {
                r#type: "submit",
                disabled: saving(),
                if saving() { "Saving..." } else { "Save profile" }
            }
        }
    }
}
