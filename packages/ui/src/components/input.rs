use dioxus::prelude::*;

#[component]
pub fn Label(#[props(default)] r#for: String, children: Element) -> Element {
    rsx! {
        label { class: "field-label", r#for: "{r#for}", {children} }
    }
}

#[component]
pub fn Input(
    #[props(default)] id: String,
    #[props(default = "text".to_string())] r#type: String,
    #[props(default)] value: String,
    #[props(default)] placeholder: String,
    #[props(default)] class: String,
    #[props(default)] disabled: bool,
    oninput: EventHandler<FormEvent>,
) -> Element {
    rsx! {
        input {
            id: "{id}",
            class: "field-input {class}",
            r#type: "{r#type}",
            value: "{value}",
            placeholder: "{placeholder}",
            disabled,
            oninput: move |evt| oninput.call(evt),
        }
    }
}

#[component]
pub fn Textarea(
    #[props(default)] id: String,
    #[props(default)] value: String,
    #[props(default)] placeholder: String,
    #[props(default = 4)] rows: u32,
    oninput: EventHandler<FormEvent>,
) -> Element {
    rsx! {
        textarea {
            id: "{id}",
            class: "field-input field-textarea",
            rows: "{rows}",
            placeholder: "{placeholder}",
            value: "{value}",
            oninput: move |evt| oninput.call(evt),
        }
    }
}

/// Native select over `(value, label)` pairs.
#[component]
pub fn Select(
    #[props(default)] id: String,
    value: String,
    options: Vec<(String, String)>,
    onchange: EventHandler<FormEvent>,
) -> Element {
    rsx! {
        select {
            id: "{id}",
            class: "field-input field-select",
            value: "{value}",
            onchange: move |evt| onchange.call(evt),
            for (option_value, label) in options {
                option {
                    key: "{option_value}",
                    value: "{option_value}",
                    selected: option_value == value,
                    "{label}"
                }
            }
        }
    }
}
