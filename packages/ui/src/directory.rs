//! Directory state shared by the filter controls and the results list.
//!
//! [`DirectoryProvider`] owns both signals so the filters and the list
//! always read and write the same [`FilterState`].

use dioxus::prelude::*;
use store::{FilterState, Listing};

use crate::session::use_hub;

#[derive(Clone, Debug, PartialEq)]
pub enum DirectoryData {
    Loading,
    Failed(String),
    Ready(Vec<Listing>),
}

/// Bumped to request a fresh fetch.
#[derive(Clone, Copy)]
pub struct DirectoryReload(Signal<u32>);

impl DirectoryReload {
    pub fn reload(mut self) {
        *self.0.write() += 1;
    }
}

pub fn use_directory_filters() -> Signal<FilterState> {
    use_context::<Signal<FilterState>>()
}

pub fn use_directory_data() -> Signal<DirectoryData> {
    use_context::<Signal<DirectoryData>>()
}

pub fn use_directory_reload() -> DirectoryReload {
    use_context::<DirectoryReload>()
}

#[component]
pub fn DirectoryProvider(children: Element) -> Element {
    let hub = use_hub();
    let mut filters = use_signal(FilterState::default);
    let mut data = use_signal(|| DirectoryData::Loading);
    let generation = use_signal(|| 0u32);

    use_context_provider(|| filters);
    use_context_provider(|| data);
    use_context_provider(|| DirectoryReload(generation));

    let loader = hub.directory.clone();
    use_effect(move || {
        let _ = generation();
        let loader = loader.clone();
        data.set(DirectoryData::Loading);
        spawn(async move {
            match loader.load().await {
                Some(Ok(listings)) => {
                    if filters.peek().page() != 1 {
                        filters.write().reset_page();
                    }
                    data.set(DirectoryData::Ready(listings));
                }
                Some(Err(e)) => {
                    tracing::error!("Failed to load communities: {e}");
                    data.set(DirectoryData::Failed(e.to_string()));
                }
                None => {}
            }
        });
    });

    let loader = hub.directory.clone();
    use_drop(move || loader.invalidate());

    rsx! {
        {children}
    }
}
