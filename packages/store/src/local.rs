//! # `localStorage` key/value store, browser side
//!
//! [`LocalStore`] is the [`KeyValueStore`] used on the web platform. Each call
//! looks up `window.localStorage` again; the handle is cheap and this keeps the
//! struct zero-sized and `Clone`.
//!
//! Errors (storage disabled, quota exceeded, private browsing) are swallowed:
//! reads return `None`, writes do nothing. The cache is advisory, so losing it
//! only costs a placeholder render until the next fetch.

use crate::cache::KeyValueStore;

#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStore;

impl LocalStore {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) {
        let Some(storage) = Self::storage() else {
            return;
        };
        if storage.set_item(key, value).is_err() {
            tracing::warn!("localStorage rejected write for {key}");
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}
