//! Session context and hooks for the UI.
//!
//! [`SessionProvider`] builds the [`Hub`] once, starts the session store's
//! event loop and mirrors every state change into a `Signal<SessionState>`.

use api::{DirectoryLoader, RestBackend, RetryPolicy, SessionState, SessionStore};
use dioxus::prelude::*;
use store::HubConfig;

use crate::platform::{make_backend, make_cache, CacheStore};

pub type AppStore = SessionStore<RestBackend, CacheStore>;

/// Shared handles every view needs: the session store, the directory loader
/// and the effective configuration.
#[derive(Clone)]
pub struct Hub {
    pub store: AppStore,
    pub directory: DirectoryLoader<RestBackend>,
    pub config: HubConfig,
}

impl Hub {
    pub fn new(config: HubConfig) -> Result<Self, api::ApiError> {
        let backend = make_backend(&config)?;
        let retry = RetryPolicy::from_config(&config.network);
        Ok(Self {
            store: SessionStore::new(backend.clone(), make_cache(), retry),
            directory: DirectoryLoader::new(backend, retry, config.network.count_concurrency),
            config,
        })
    }

    pub fn backend(&self) -> &RestBackend {
        self.store.backend()
    }

    pub fn retry(&self) -> RetryPolicy {
        RetryPolicy::from_config(&self.config.network)
    }
}

impl PartialEq for Hub {
    fn eq(&self, other: &Self) -> bool {
        self.store.ptr_eq(&other.store) && self.config == other.config
    }
}

/// Current session snapshot; updates on sign-in, sign-out and profile loads.
pub fn use_session() -> Signal<SessionState> {
    use_context::<Signal<SessionState>>()
}

pub fn use_hub() -> Hub {
    use_context::<Hub>()
}

/// Wrap the app with this component to enable sessions.
#[component]
pub fn SessionProvider(config: HubConfig, children: Element) -> Element {
    let hub = use_hook(|| Hub::new(config.clone()).map_err(|e| e.to_string()));

    match hub {
        Ok(hub) => rsx! {
            SessionScope { hub, {children} }
        },
        Err(message) => {
            tracing::error!("Cannot start: {message}");
            rsx! {
                div {
                    class: "fatal-error",
                    h1 { "CreatorHub could not start" }
                    p { "{message}" }
                }
            }
        }
    }
}

#[component]
fn SessionScope(hub: Hub, children: Element) -> Element {
    let mut state = use_signal(|| hub.store.snapshot());
    let store = hub.store.clone();

    use_effect(move || {
        let runner = store.clone();
        spawn(async move {
            runner.run().await;
        });

        let mut changes = store.subscribe();
        spawn(async move {
            while changes.changed().await.is_ok() {
                let next = changes.borrow_and_update().clone();
                state.set(next);
            }
        });
    });

    use_context_provider(|| hub.clone());
    use_context_provider(|| state);

    rsx! {
        {children}
    }
}
