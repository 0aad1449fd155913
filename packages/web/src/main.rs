use dioxus::prelude::*;

use store::HubConfig;
use ui::icons::{FaPlus, FaUsers};
use ui::{use_hub, use_session, Icon, Navbar, SessionProvider, ToastProvider, UserMenu};
use views::{CommunityDetail, CreateCommunity, Home, Login, NotFound, Profile, SignUp};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(Shell)]
        #[route("/")]
        Home {},
        #[route("/login")]
        Login {},
        #[route("/signup")]
        SignUp {},
        #[route("/profile")]
        Profile {},
        #[route("/create-community")]
        CreateCommunity {},
        #[route("/community/:id/:tab")]
        CommunityDetail { id: String, tab: String },
        #[route("/:..segments")]
        NotFound { segments: Vec<String> },
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

/// Configuration compiled into the bundle.
const EMBEDDED_CONFIG: &str = include_str!("../creatorhub.toml");

fn main() {
    dioxus::launch(App);
}

fn load_config() -> HubConfig {
    let config = HubConfig::from_toml(EMBEDDED_CONFIG).unwrap_or_else(|e| {
        tracing::warn!("Invalid {}, using defaults: {e}", HubConfig::filename());
        HubConfig::default()
    });
    config.with_backend(
        option_env!("CREATORHUB_BACKEND_URL"),
        option_env!("CREATORHUB_ANON_KEY"),
    )
}

#[component]
fn App() -> Element {
    let config = use_hook(load_config);

    rsx! {
        document::Link { rel: "stylesheet", href: ui::CREATORHUB_CSS }
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        ToastProvider {
            SessionProvider {
                config,
                StorageBootstrap {}
                Router::<Route> {}
            }
        }
    }
}

/// Makes sure the upload buckets exist. Failures are only logged; uploads
/// surface their own errors later.
#[component]
fn StorageBootstrap() -> Element {
    let hub = use_hub();

    use_hook(move || {
        spawn(async move {
            let storage = &hub.config.storage;
            for bucket in [&storage.avatars_bucket, &storage.community_bucket] {
                match api::ensure_bucket(hub.backend(), bucket).await {
                    Ok(true) => tracing::info!("Created storage bucket {bucket}"),
                    Ok(false) => tracing::debug!("Storage bucket {bucket} present"),
                    Err(e) => tracing::warn!("Storage bucket {bucket} check failed: {e}"),
                }
            }
        });
    });

    rsx! {}
}

/// Navbar above every page.
#[component]
fn Shell() -> Element {
    let session = use_session();
    let nav = use_navigator();
    let state = session();

    rsx! {
        Navbar {
            Link {
                class: "navbar__brand",
                to: Route::Home {},
                Icon { icon: FaUsers, width: 20, height: 20 }
                span { "CreatorHub" }
            }
            div { class: "navbar__spacer" }
            if state.is_signed_in() {
                Link {
                    class: "navbar__link",
                    to: Route::CreateCommunity {},
                    Icon { icon: FaPlus, width: 12, height: 12 }
                    span { "Create community" }
                }
            } else if !state.loading {
                Link { class: "navbar__link", to: Route::Login {}, "Sign in" }
                Link { class: "navbar__link navbar__link--primary", to: Route::SignUp {}, "Sign up" }
            }
            UserMenu {
                on_profile: move |_| {
                    nav.push(Route::Profile {});
                },
                on_signed_out: move |_| {
                    nav.replace(Route::Home {});
                },
            }
        }

        main {
            class: "shell",
            Outlet::<Route> {}
        }
    }
}
