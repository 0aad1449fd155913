//! Community page with about, members and rules tabs.

use api::{CommunityDetail as Detail, FormError, JoinOutcome};
use dioxus::prelude::*;
use store::directory::{category_icon, category_label, FALLBACK_IMAGE, LANGUAGES};
use ui::components::{Button, ButtonVariant};
use ui::icons::{FaMoneyBill, FaUserGroup};
use ui::{push_toast, use_hub, use_session, use_toasts, CategoryIconView, Icon, Markdown, ToastLevel};

use crate::Route;

#[derive(Clone, Copy, Debug, PartialEq)]
enum DetailTab {
    About,
    Members,
    Rules,
}

impl DetailTab {
    const ALL: [DetailTab; 3] = [DetailTab::About, DetailTab::Members, DetailTab::Rules];

    /// Unknown segments fall back to the about tab.
    fn parse(tab: &str) -> Self {
        match tab {
            "members" => DetailTab::Members,
            "rules" => DetailTab::Rules,
            _ => DetailTab::About,
        }
    }

    fn slug(self) -> &'static str {
        match self {
            DetailTab::About => "about",
            DetailTab::Members => "members",
            DetailTab::Rules => "rules",
        }
    }

    fn label(self) -> &'static str {
        match self {
            DetailTab::About => "About",
            DetailTab::Members => "Members",
            DetailTab::Rules => "Rules",
        }
    }
}

fn language_label(id: &str) -> String {
    LANGUAGES
        .iter()
        .find(|l| l.id.eq_ignore_ascii_case(id))
        .map(|l| format!("{} {}", l.flag, l.label))
        .unwrap_or_else(|| id.to_string())
}

#[component]
pub fn CommunityDetail(id: String, tab: String) -> Element {
    let hub = use_hub();
    let session = use_session();

    // Route params are props; mirror the id into a signal so the resource
    // re-runs when it changes.
    let mut id_signal = use_signal(|| id.clone());
    if *id_signal.peek() != id {
        id_signal.set(id.clone());
    }
    let viewer = use_memo(move || session().user);

    let mut detail = use_resource(move || {
        let hub = hub.clone();
        let id = id_signal();
        let viewer = viewer();
        async move { api::fetch_community_detail(hub.backend(), hub.retry(), &id, viewer.as_ref()).await }
    });

    let active = DetailTab::parse(&tab);

    match detail() {
        None => rsx! {
            div { class: "page directory-status", "Loading community..." }
        },
        Some(Err(e)) => {
            tracing::error!("Failed to load community {id}: {e}");
            rsx! {
                div {
                    class: "page directory-status directory-status--error",
                    p { "Could not load this community. {e}" }
                    Button {
                        variant: ButtonVariant::Secondary,
                        onclick: move |_| detail.restart(),
                        "Try again"
                    }
                }
            }
        }
        Some(Ok(None)) => rsx! {
            div {
                class: "not-found",
                h1 { "Community not found" }
                p { class: "page-subtitle", "It may have been removed." }
                Link { to: Route::Home {}, "Back to the directory" }
            }
        },
        Some(Ok(Some(detail_data))) => rsx! {
            DetailBody {
                detail: detail_data,
                active,
                on_joined: move |_| detail.restart(),
            }
        },
    }
}

#[component]
fn DetailBody(detail: Detail, active: DetailTab, on_joined: EventHandler<()>) -> Element {
    let community = detail.community.clone();
    let banner = community
        .banner_url
        .clone()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| FALLBACK_IMAGE.to_string());
    let fee = match community.membership_fee.filter(|fee| *fee > 0.0) {
        Some(fee) => format!("${fee:.2}/month"),
        None => "Free".to_string(),
    };
    let seats = match community.max_members {
        Some(max) => format!("{} / {max} members", detail.members),
        None => format!("{} members", detail.members),
    };
    let category = community.category.clone().unwrap_or_default();
    let tabs = DetailTab::ALL.map(|tab| {
        let class = if tab == active { "detail-tab detail-tab--active" } else { "detail-tab" };
        (tab, class)
    });
    let language = community.language.clone().map(|l| language_label(&l));

    rsx! {
        div {
            class: "page page--wide",
            div {
                class: "detail-banner",
                img { src: "{banner}", alt: "{community.name}" }
            }

            div {
                class: "detail-header",
                if let Some(logo) = community.logo_url.clone().filter(|u| !u.is_empty()) {
                    img { class: "detail-header__logo", src: "{logo}", alt: "" }
                }
                div {
                    class: "detail-header__text",
                    h1 { "{community.name}" }
                    div {
                        class: "detail-header__meta",
                        if !category.is_empty() {
                            span {
                                CategoryIconView { icon: category_icon(Some(&category)), size: 12 }
                                " {category_label(&category)}"
                            }
                        }
                        if let Some(language) = language {
                            span { "{language}" }
                        }
                        span {
                            Icon { icon: FaMoneyBill, width: 12, height: 12 }
                            " {fee}"
                        }
                        span {
                            Icon { icon: FaUserGroup, width: 12, height: 12 }
                            " {seats}"
                        }
                    }
                }
                JoinButton { detail: detail.clone(), on_joined }
            }

            nav {
                class: "detail-tabs",
                for (tab, class) in tabs {
                    Link {
                        key: "{tab.slug()}",
                        class,
                        to: Route::CommunityDetail { id: community.id.clone(), tab: tab.slug().to_string() },
                        "{tab.label()}"
                    }
                }
            }

            {match active {
                DetailTab::About => rsx! {
                    {match community.description.clone().filter(|d| !d.trim().is_empty()) {
                        Some(description) => rsx! { Markdown { source: description } },
                        None => rsx! { p { class: "page-subtitle", "No description yet." } },
                    }}
                    if let Some(src) = community.video_src() {
                        div {
                            class: "detail-video",
                            iframe {
                                src: "{src}",
                                title: "{community.name} video",
                                allowfullscreen: true,
                            }
                        }
                    }
                },
                DetailTab::Members => rsx! {
                    div {
                        class: "detail-stats",
                        div {
                            class: "detail-stat",
                            strong { "{detail.members}" }
                            "Members"
                        }
                        if let Some(max) = community.max_members {
                            div {
                                class: "detail-stat",
                                strong { "{u64::from(max).saturating_sub(detail.members)}" }
                                "Seats left"
                            }
                        }
                    }
                },
                DetailTab::Rules => rsx! {
                    {match community.rules.clone().filter(|r| !r.trim().is_empty()) {
                        Some(rules) => rsx! { Markdown { source: rules } },
                        None => rsx! { p { class: "page-subtitle", "This community has no rules posted." } },
                    }}
                },
            }}
        }
    }
}

/// Join action for the current viewer; disabled when already a member or
/// the community is full.
#[component]
fn JoinButton(detail: Detail, on_joined: EventHandler<()>) -> Element {
    let hub = use_hub();
    let session = use_session();
    let mut toasts = use_toasts();
    let nav = use_navigator();
    let mut joining = use_signal(|| false);

    let state = session();
    if let Some(membership) = &detail.membership {
        let role = membership.role.label();
        return rsx! {
            span { class: "badge", "{role}" }
        };
    }
    if detail.is_full() {
        return rsx! {
            span { class: "badge badge--full", "Full" }
        };
    }

    let community = detail.community.clone();
    let handle_join = move |_| {
        let Some(user) = session().user else {
            nav.push(Route::Login {});
            return;
        };
        let hub = hub.clone();
        let community = community.clone();
        spawn(async move {
            joining.set(true);
            let result = api::join_community(hub.backend(), Some(&user), &community).await;
            joining.set(false);
            match result {
                Ok(JoinOutcome::Joined(_)) => {
                    push_toast(&mut toasts, ToastLevel::Success, "Welcome aboard", &community.name);
                    on_joined.call(());
                }
                Ok(JoinOutcome::AlreadyMember(_)) => on_joined.call(()),
                Err(FormError::CommunityFull) => {
                    push_toast(&mut toasts, ToastLevel::Info, "Community is full", &community.name);
                    on_joined.call(());
                }
                Err(e) => {
                    tracing::error!("Join {} failed: {e}", community.id);
                    push_toast(&mut toasts, ToastLevel::Error, "Could not join", &e.to_string());
                }
            }
        });
    };

    rsx! {
        Button {
            variant: ButtonVariant::Primary,
            disabled: joining() || state.loading,
            onclick: handle_join,
            if state.is_signed_in() { "Join community" } else { "Sign in to join" }
        }
    }
}
