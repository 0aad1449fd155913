use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use store::ImageFile;

use crate::icons::{FaImage, FaXmark};
use crate::platform::{preview_url, revoke_preview};
use crate::Icon;

/// Image chosen in an [`ImagePicker`], with a local preview URL when the
/// platform can make one.
#[derive(Clone, Debug, PartialEq)]
pub struct PickedImage {
    pub file: ImageFile,
    pub preview: Option<String>,
}

impl PickedImage {
    /// Revoke the local preview URL, if one was made.
    pub fn release(&self) {
        if let Some(url) = &self.preview {
            revoke_preview(url);
        }
    }
}

/// Drop the picked image and its preview, e.g. after a successful submit.
pub fn discard_picked(picked: &mut Signal<Option<PickedImage>>) {
    let image = picked.write().take();
    if let Some(image) = image {
        image.release();
    }
}

/// File input limited to images. Reads the file into memory on selection;
/// nothing is uploaded until the surrounding form is submitted.
#[component]
pub fn ImagePicker(
    id: String,
    label: String,
    picked: Option<PickedImage>,
    /// Image already stored remotely, shown when nothing is picked.
    #[props(default)]
    current_url: Option<String>,
    on_pick: EventHandler<Option<PickedImage>>,
) -> Element {
    // Preview shown right now; revoked when the picker goes away.
    let live_preview = use_hook(|| Rc::new(RefCell::new(Option::<String>::None)));
    *live_preview.borrow_mut() = picked.as_ref().and_then(|p| p.preview.clone());
    use_drop({
        let live_preview = live_preview.clone();
        move || {
            if let Some(url) = live_preview.borrow_mut().take() {
                revoke_preview(&url);
            }
        }
    });

    let shown = picked
        .as_ref()
        .and_then(|p| p.preview.clone())
        .or(current_url);
    let previous = picked.as_ref().and_then(|p| p.preview.clone());
    let file_name = picked.as_ref().map(|p| p.file.name.clone());

    let handle_change = move |evt: FormEvent| {
        let previous = previous.clone();
        async move {
            let Some(file) = evt.files().into_iter().next() else {
                return;
            };
            let bytes = match file.read_bytes().await {
                Ok(bytes) => bytes.to_vec(),
                Err(e) => {
                    tracing::error!("Failed to read {}: {e}", file.name());
                    return;
                }
            };
            let image = ImageFile::new(file.name(), file.content_type(), bytes);
            if let Some(url) = &previous {
                revoke_preview(url);
            }
            let preview = preview_url(&image.bytes, &image.mime());
            on_pick.call(Some(PickedImage { file: image, preview }));
        }
    };

    let previous_on_clear = picked.as_ref().and_then(|p| p.preview.clone());
    let handle_clear = move |_| {
        if let Some(url) = &previous_on_clear {
            revoke_preview(url);
        }
        on_pick.call(None);
    };

    rsx! {
        div {
            class: "image-picker",
            label {
                class: "image-picker__drop",
                r#for: "{id}",
                if let Some(url) = shown {
                    img { class: "image-picker__preview", src: "{url}", alt: "{label}" }
                } else {
                    Icon { icon: FaImage, width: 24, height: 24 }
                    span { "{label}" }
                }
            }
            input {
                id: "{id}",
                class: "image-picker__input",
                r#type: "file",
                accept: "image/*",
                onchange: handle_change,
            }
            if let Some(name) = file_name {
                div {
                    class: "image-picker__file",
                    span { "{name}" }
                    button {
                        r#type: "button",
                        title: "Remove",
                        onclick: handle_clear,
                        Icon { icon: FaXmark, width: 10, height: 10 }
                    }
                }
            }
        }
    }
}
