//! # Application configuration (`creatorhub.toml`)
//!
//! The web app embeds this file at build time. Every section and key is
//! optional, so an empty file is equivalent to [`HubConfig::default`].
//!
//! ```toml
//! [backend]
//! url = "https://project.supabase.co"
//! anon_key = "public-anon-key"
//!
//! [storage]
//! avatars_bucket = "avatars"
//! community_bucket = "community-images"
//!
//! [network]
//! retry_attempts = 3
//! retry_delay_ms = 300
//! count_concurrency = 4
//! ```
//!
//! | Struct | Purpose |
//! |--------|---------|
//! | [`HubConfig`] | Top-level config with TOML (de)serialisation and env overrides. |
//! | [`BackendConfig`] | Where the backend lives and the public key sent with every request. |
//! | [`StorageConfig`] | Bucket names for avatars and community images. |
//! | [`NetworkConfig`] | Read retry policy and member-count fan-out. |

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL without trailing slash.
    #[serde(default = "default_backend_url")]
    pub url: String,
    /// Public (anon) API key.
    #[serde(default)]
    pub anon_key: String,
}

fn default_backend_url() -> String {
    "http://localhost:54321".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            anon_key: String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_avatars_bucket")]
    pub avatars_bucket: String,
    #[serde(default = "default_community_bucket")]
    pub community_bucket: String,
}

fn default_avatars_bucket() -> String {
    "avatars".to_string()
}

fn default_community_bucket() -> String {
    "community-images".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            avatars_bucket: default_avatars_bucket(),
            community_bucket: default_community_bucket(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Total attempts for read requests, including the first one.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Base delay between attempts; attempt `n` waits `n * retry_delay_ms`.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Maximum member-count queries in flight at once.
    #[serde(default = "default_count_concurrency")]
    pub count_concurrency: usize,
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    300
}

fn default_count_concurrency() -> usize {
    4
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            count_concurrency: default_count_concurrency(),
        }
    }
}

impl HubConfig {
    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "creatorhub.toml"
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Builder method to override backend coordinates. Empty values are ignored.
    pub fn with_backend(mut self, url: Option<&str>, anon_key: Option<&str>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.backend.url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(key) = anon_key.filter(|k| !k.trim().is_empty()) {
            self.backend.anon_key = key.trim().to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = HubConfig::from_toml("").unwrap();
        assert_eq!(config, HubConfig::default());
        assert_eq!(config.network.retry_attempts, 3);
        assert_eq!(config.storage.community_bucket, "community-images");
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = HubConfig::from_toml(
            r#"
            [backend]
            url = "https://demo.supabase.co"

            [network]
            count_concurrency = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.url, "https://demo.supabase.co");
        assert_eq!(config.backend.anon_key, "");
        assert_eq!(config.network.count_concurrency, 8);
        assert_eq!(config.network.retry_delay_ms, 300);
    }

    #[test]
    fn test_backend_override_ignores_blank_values() {
        let config = HubConfig::default().with_backend(Some("https://x.test/"), Some("  "));
        assert_eq!(config.backend.url, "https://x.test");
        assert_eq!(config.backend.anon_key, "");
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = HubConfig::default().with_backend(Some("https://x.test"), Some("key"));
        let text = config.to_toml().unwrap();
        assert_eq!(HubConfig::from_toml(&text).unwrap(), config);
    }
}
