//! Platform-specific constructors and helpers.
//!
//! The profile cache is backed by:
//! - **Web** (WASM + `web` feature): `localStorage` via [`store::LocalStore`]
//! - **Everything else**: process memory via [`store::MemoryStore`]

use std::time::Duration;

use api::{ApiError, RestBackend};
use store::HubConfig;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub type CacheStore = store::LocalStore;
#[cfg(not(all(target_arch = "wasm32", feature = "web")))]
pub type CacheStore = store::MemoryStore;

pub fn make_cache() -> CacheStore {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        store::LocalStore
    }
    #[cfg(not(all(target_arch = "wasm32", feature = "web")))]
    {
        store::MemoryStore::new()
    }
}

pub fn make_backend(config: &HubConfig) -> Result<RestBackend, ApiError> {
    RestBackend::new(&config.backend)
}

pub async fn sleep(duration: Duration) {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::sleep(duration).await;
    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(duration).await;
}

/// Smoothly scroll the window back to the top.
pub fn scroll_to_top() {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = web_sys::window() {
            let options = web_sys::ScrollToOptions::new();
            options.set_top(0.0);
            options.set_behavior(web_sys::ScrollBehavior::Smooth);
            window.scroll_to_with_scroll_to_options(&options);
        }
    }
}

/// Object URL previewing `bytes` in the browser. `None` off the web.
pub fn preview_url(bytes: &[u8], mime: &str) -> Option<String> {
    #[cfg(target_arch = "wasm32")]
    {
        let chunk = js_sys::Uint8Array::from(bytes);
        let parts = js_sys::Array::of1(&chunk);
        let options = web_sys::BlobPropertyBag::new();
        options.set_type(mime);
        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options).ok()?;
        web_sys::Url::create_object_url_with_blob(&blob).ok()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = (bytes, mime);
        None
    }
}

pub fn revoke_preview(url: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        let _ = web_sys::Url::revoke_object_url(url);
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        #[cfg(test)]
        REVOKED.with(|r| r.borrow_mut().push(url.to_string()));
        let _ = url;
    }
}

#[cfg(test)]
thread_local! {
    /// Preview URLs passed to [`revoke_preview`] on this thread.
    pub(crate) static REVOKED: std::cell::RefCell<Vec<String>> = const { std::cell::RefCell::new(Vec::new()) };
}
