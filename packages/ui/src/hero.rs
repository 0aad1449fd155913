use dioxus::prelude::*;

use crate::components::{Button, ButtonVariant};
use crate::icons::FaPlus;
use crate::Icon;

#[component]
pub fn Hero(on_create: EventHandler<()>) -> Element {
    rsx! {
        section {
            class: "hero",
            h1 { class: "hero__title", "Find your people" }
            p {
                class: "hero__subtitle",
                "Join communities run by creators you love, or start your own."
            }
            Button {
                variant: ButtonVariant::Primary,
                onclick: move |_| on_create.call(()),
                Icon { icon: FaPlus, width: 12, height: 12 }
                " Create a community"
            }
        }
    }
}
