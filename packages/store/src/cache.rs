//! # Local key/value cache and the profile snapshot
//!
//! [`KeyValueStore`] is the minimal string storage the app needs from the
//! platform: `localStorage` in the browser ([`crate::LocalStore`]) and an
//! in-memory map everywhere else ([`crate::MemoryStore`]).
//!
//! [`ProfileCache`] stores one [`Profile`] snapshot as JSON under
//! [`PROFILE_CACHE_KEY`]. The snapshot is advisory: a missing or unparseable
//! entry reads as `None` and never fails.

use crate::models::Profile;

/// Fixed key of the profile snapshot.
pub const PROFILE_CACHE_KEY: &str = "creatorhub-profile";

/// Synchronous string storage. Writes are best effort.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Typed access to the cached profile snapshot.
#[derive(Clone, Debug)]
pub struct ProfileCache<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ProfileCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read the snapshot. Corrupt entries are treated as a cache miss.
    pub fn load(&self) -> Option<Profile> {
        let raw = self.store.get(PROFILE_CACHE_KEY)?;
        match serde_json::from_str::<Profile>(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!("Ignoring unreadable cached profile: {e}");
                None
            }
        }
    }

    pub fn save(&self, profile: &Profile) {
        match serde_json::to_string(profile) {
            Ok(raw) => self.store.set(PROFILE_CACHE_KEY, &raw),
            Err(e) => tracing::warn!("Failed to serialise profile for cache: {e}"),
        }
    }

    pub fn clear(&self) {
        self.store.remove(PROFILE_CACHE_KEY);
    }

    pub fn inner(&self) -> &S {
        &self.store
    }
}
