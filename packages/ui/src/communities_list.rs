use dioxus::prelude::*;
use store::{DirectoryView, PageView};

use crate::community_card::CommunityCard;
use crate::components::{Button, ButtonVariant};
use crate::directory::{use_directory_data, use_directory_filters, use_directory_reload, DirectoryData};
use crate::icons::{FaChevronLeft, FaChevronRight, FaSpinner};
use crate::platform::scroll_to_top;
use crate::Icon;

/// Filtered, paginated directory results.
#[component]
pub fn CommunitiesList(on_select: EventHandler<String>) -> Element {
    let data = use_directory_data();
    let mut filters = use_directory_filters();
    let reload = use_directory_reload();

    let listings = match data() {
        DirectoryData::Loading => {
            return rsx! {
                div {
                    class: "directory-status",
                    Icon { icon: FaSpinner, width: 20, height: 20, class: "spin" }
                    " Loading communities..."
                }
            };
        }
        DirectoryData::Failed(message) => {
            return rsx! {
                div {
                    class: "directory-status directory-status--error",
                    p { "Could not load communities: {message}" }
                    Button {
                        variant: ButtonVariant::Secondary,
                        onclick: move |_| reload.reload(),
                        "Try again"
                    }
                }
            };
        }
        DirectoryData::Ready(listings) => listings,
    };

    match DirectoryView::compute(&listings, &filters()) {
        DirectoryView::Empty => rsx! {
            div {
                class: "directory-status",
                h3 { "No communities yet" }
                p { "Be the first to create one." }
            }
        },
        DirectoryView::NoMatches => rsx! {
            div {
                class: "directory-status",
                h3 { "No communities found" }
                p { "Try a different search or filter." }
            }
        },
        DirectoryView::Page(PageView { items, page, total_pages }) => rsx! {
            div {
                class: "communities-grid",
                for listing in items {
                    CommunityCard {
                        key: "{listing.id}",
                        listing: listing.clone(),
                        on_select: move |id| on_select.call(id),
                    }
                }
            }
            if total_pages > 1 {
                Pagination {
                    page,
                    total_pages,
                    on_change: move |target: usize| {
                        if filters.write().go_to_page(target, total_pages) {
                            scroll_to_top();
                        }
                    },
                }
            }
        },
    }
}

#[component]
pub fn Pagination(page: usize, total_pages: usize, on_change: EventHandler<usize>) -> Element {
    rsx! {
        nav {
            class: "pagination",
            button {
                class: "pagination__step",
                disabled: page <= 1,
                onclick: move |_| on_change.call(page.saturating_sub(1)),
                Icon { icon: FaChevronLeft, width: 12, height: 12 }
            }
            for number in 1..=total_pages {
                button {
                    key: "{number}",
                    class: if number == page { "pagination__page pagination__page--active" } else { "pagination__page" },
                    onclick: move |_| on_change.call(number),
                    "{number}"
                }
            }
            button {
                class: "pagination__step",
                disabled: page >= total_pages,
                onclick: move |_| on_change.call(page + 1),
                Icon { icon: FaChevronRight, width: 12, height: 12 }
            }
        }
    }
}
