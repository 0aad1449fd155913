use dioxus::prelude::*;
use store::directory::{CATEGORIES, LANGUAGES};

use crate::category_icon::CategoryIconView;
use crate::components::Select;
use crate::directory::use_directory_filters;
use crate::icons::FaMagnifyingGlass;
use crate::Icon;

/// Search box, category chips and language picker. Every change resets the
/// directory to page 1.
#[component]
pub fn FilterSection() -> Element {
    let mut filters = use_directory_filters();
    let current = filters();

    let languages: Vec<(String, String)> = LANGUAGES
        .iter()
        .map(|l| (l.id.to_string(), format!("{} {}", l.flag, l.label)))
        .collect();

    rsx! {
        section {
            class: "filter-section",

            div {
                class: "filter-search",
                Icon { icon: FaMagnifyingGlass, width: 14, height: 14 }
                input {
                    r#type: "search",
                    placeholder: "Search communities...",
                    value: "{current.query()}",
                    oninput: move |evt: FormEvent| filters.write().set_query(evt.value()),
                }
            }

            div {
                class: "filter-categories",
                for category in CATEGORIES.iter() {
                    button {
                        key: "{category.id}",
                        r#type: "button",
                        class: if current.category() == category.id { "chip chip--active" } else { "chip" },
                        onclick: move |_| filters.write().set_category(category.id),
                        CategoryIconView { icon: category.icon, size: 12 }
                        " {category.label}"
                    }
                }
            }

            div {
                class: "filter-language",
                Select {
                    id: "language-filter",
                    value: current.language().to_string(),
                    options: languages,
                    onchange: move |evt: FormEvent| filters.write().set_language(evt.value()),
                }
            }
        }
    }
}
