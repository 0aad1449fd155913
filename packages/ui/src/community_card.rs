use dioxus::prelude::*;
use store::directory::category_label;
use store::Listing;

use crate::category_icon::CategoryIconView;
use crate::icons::{FaGlobe, FaLock, FaUserGroup};
use crate::Icon;

/// Directory card. Clicking anywhere on it selects the community.
#[component]
pub fn CommunityCard(listing: Listing, on_select: EventHandler<String>) -> Element {
    let id = listing.id.clone();
    let seats = match listing.max_members {
        Some(max) => format!("{} / {max}", listing.members),
        None => listing.members.to_string(),
    };
    let price = match listing.price {
        Some(fee) => format!("${fee:.2}/month"),
        None => "Free".to_string(),
    };
    let category = listing.category.as_deref().map(category_label);

    rsx! {
        article {
            class: "community-card",
            role: "button",
            tabindex: "0",
            onclick: move |_| on_select.call(id.clone()),

            div {
                class: "community-card__banner",
                img { src: "{listing.image}", alt: "", loading: "lazy" }
                if let Some(logo) = &listing.logo {
                    img { class: "community-card__logo", src: "{logo}", alt: "" }
                }
            }

            div {
                class: "community-card__body",
                div {
                    class: "community-card__meta",
                    span {
                        class: "community-card__category",
                        CategoryIconView { icon: listing.icon, size: 12 }
                        if let Some(label) = category {
                            " {label}"
                        }
                    }
                    if !listing.language.is_empty() {
                        span {
                            class: "community-card__language",
                            Icon { icon: FaGlobe, width: 12, height: 12 }
                            " {listing.language}"
                        }
                    }
                }
                h3 { class: "community-card__title", "{listing.title}" }
                p { class: "community-card__description", "{listing.description}" }
            }

            footer {
                class: "community-card__footer",
                span {
                    class: "community-card__members",
                    Icon { icon: FaUserGroup, width: 12, height: 12 }
                    " {seats}"
                }
                if listing.is_full() {
                    span {
                        class: "badge badge--full",
                        Icon { icon: FaLock, width: 10, height: 10 }
                        " Full"
                    }
                }
                span { class: "community-card__price", "{price}" }
            }
        }
    }
}
