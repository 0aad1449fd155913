use dioxus::prelude::*;
use store::directory::{ALL, CATEGORIES, LANGUAGES};
use store::{Community, CommunityDraft};

use crate::components::{Button, Input, Label, Select, Textarea};
use crate::image_picker::{ImagePicker, PickedImage};
use crate::session::{use_hub, use_session};
use crate::toast::{push_toast, use_toasts, ToastLevel};
use crate::Markdown;

fn options<T>(items: &[T], entry: impl Fn(&T) -> (&'static str, &'static str)) -> Vec<(String, String)> {
    items
        .iter()
        .map(entry)
        .filter(|(id, _)| *id != ALL)
        .map(|(id, label)| (id.to_string(), label.to_string()))
        .collect()
}

/// Community creation form. Fields survive a failed submit.
#[component]
pub fn CommunityForm(on_created: EventHandler<Community>) -> Element {
    let hub = use_hub();
    let session = use_session();
    let mut toasts = use_toasts();

    let mut name = use_signal(String::new);
    let mut description = use_signal(String::new);
    let mut category = use_signal(|| "hobbies".to_string());
    let mut language = use_signal(|| "english".to_string());
    let mut rules = use_signal(String::new);
    let mut max_members = use_signal(String::new);
    let mut membership_fee = use_signal(String::new);
    let mut video_embed = use_signal(String::new);
    let mut logo = use_signal(|| Option::<PickedImage>::None);
    let mut banner = use_signal(|| Option::<PickedImage>::None);
    let mut submitting = use_signal(|| false);
    let mut show_rules_preview = use_signal(|| false);

    let categories = options(CATEGORIES, |c| (c.id, c.label));
    let languages = options(LANGUAGES, |l| (l.id, l.label));

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if submitting() {
            return;
        }
        let hub = hub.clone();
        let draft = CommunityDraft {
            name: name(),
            description: description(),
            category: category(),
            language: language(),
            rules: rules(),
            max_members: max_members(),
            membership_fee: membership_fee(),
            video_embed: video_embed(),
            logo: logo().map(|p| p.file),
            banner: banner().map(|p| p.file),
        };
        let user = session().user;
        spawn(async move {
            submitting.set(true);
            let result = api::create_community(
                hub.backend(),
                &hub.config.storage,
                user.as_ref(),
                &draft,
            )
            .await;
            submitting.set(false);

            match result {
                Ok(community) => {
                    push_toast(&mut toasts, ToastLevel::Success, "Community created", &community.name);
                    on_created.call(community);
                }
                Err(e) => {
                    let title = if e.is_validation() { "Check the form" } else { "Could not create community" };
                    push_toast(&mut toasts, ToastLevel::Error, title, &e.to_string());
                }
            }
        });
    };

    rsx! {
        form {
            class: "community-form",
            onsubmit: handle_submit,

            div {
                class: "form-images",
                div {
                    class: "form-field",
                    Label { r#for: "community-banner", "Banner" }
                    ImagePicker {
                        id: "community-banner",
                        label: "Upload a banner",
                        picked: banner(),
                        on_pick: move |picked| banner.set(picked),
                    }
                }
                div {
                    class: "form-field",
                    Label { r#for: "community-logo", "Logo" }
                    ImagePicker {
                        id: "community-logo",
                        label: "Upload a logo",
                        picked: logo(),
                        on_pick: move |picked| logo.set(picked),
                    }
                }
            }

            div {
                class: "form-field",
                Label { r#for: "community-name", "Name" }
                Input {
                    id: "community-name",
                    value: name(),
                    placeholder: "e.g. Weekend Woodworkers",
                    oninput: move |evt: FormEvent| name.set(evt.value()),
                }
            }

            div {
                class: "form-field",
                Label { r#for: "community-description", "Description" }
                Textarea {
                    id: "community-description",
                    value: description(),
                    placeholder: "What is this community about?",
                    oninput: move |evt: FormEvent| description.set(evt.value()),
                }
            }

            div {
                class: "form-row",
                div {
                    class: "form-field",
                    Label { r#for: "community-category", "Category" }
                    Select {
                        id: "community-category",
                        value: category(),
                        options: categories,
                        onchange: move |evt: FormEvent| category.set(evt.value()),
                    }
                }
                div {
                    class: "form-field",
                    Label { r#for: "community-language", "Language" }
                    Select {
                        id: "community-language",
                        value: language(),
                        options: languages,
                        onchange: move |evt: FormEvent| language.set(evt.value()),
                    }
                }
            }

            div {
                class: "form-row",
                div {
                    class: "form-field",
                    Label { r#for: "community-max-members", "Seat limit" }
                    Input {
                        id: "community-max-members",
                        r#type: "number",
                        value: max_members(),
                        placeholder: "Unlimited",
                        oninput: move |evt: FormEvent| max_members.set(evt.value()),
                    }
                }
                div {
                    class: "form-field",
                    Label { r#for: "community-fee", "Monthly fee (USD)" }
                    Input {
                        id: "community-fee",
                        r#type: "number",
                        value: membership_fee(),
                        placeholder: "Free",
                        oninput: move |evt: FormEvent| membership_fee.set(evt.value()),
                    }
                }
            }

            div {
                class: "form-field",
                div {
                    class: "form-field__header",
                    Label { r#for: "community-rules", "Rules (Markdown)" }
                    button {
                        r#type: "button",
                        class: "link-button",
                        onclick: move |_| show_rules_preview.toggle(),
                        if show_rules_preview() { "Edit" } else { "Preview" }
                    }
                }
                if show_rules_preview() {
                    Markdown { source: rules(), class: "form-preview" }
                } else {
                    Textarea {
                        id: "community-rules",
                        value: rules(),
                        rows: 6,
                        placeholder: "1. Be kind\n2. No spam",
                        oninput: move |evt: FormEvent| rules.set(evt.value()),
                    }
                }
            }

            div {
                class: "form-field",
                Label { r#for: "community-video", "Intro video embed" }
                Input {
                    id: "community-video",
                    value: video_embed(),
                    placeholder: "https://www.youtube.com/embed/...",
                    oninput: move |evt: FormEvent| video_embed.set(evt.value()),
                }
            }

            Button {
                r#type: "submit",
                disabled: submitting(),
                if submitting() { "Creating..." } else { "Create community" }
            }
        }
    }
}
