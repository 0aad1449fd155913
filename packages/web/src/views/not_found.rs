use dioxus::prelude::*;

use crate::Route;

#[component]
pub fn NotFound(segments: Vec<String>) -> Element {
    let path = segments.join("/");
    tracing::debug!("No route for /{path}");

    rsx! {
        div {
            class: "not-found",
            h1 { "Page not found" }
            p { class: "page-subtitle", "There is nothing at /{path}." }
            Link { to: Route::Home {}, "Back to the directory" }
        }
    }
}
