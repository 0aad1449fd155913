//! # HTTP backend
//!
//! [`RestBackend`] talks to a Supabase-style backend-as-a-service over its
//! three REST surfaces:
//!
//! | Surface | Prefix | Module |
//! |---------|--------|--------|
//! | Auth | `/auth/v1` | [`auth`] |
//! | Records | `/rest/v1` | [`records`] |
//! | Object storage | `/storage/v1` | [`storage`] |
//!
//! Every request carries the project's anon key as `apikey` and a bearer
//! token: the signed-in user's access token when a session is held, the anon
//! key otherwise. The session lives in memory only; a page reload starts
//! anonymous and relies on the cached profile for the first paint.

mod auth;
mod records;
mod storage;

use std::sync::{Arc, RwLock};
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use store::config::BackendConfig;
use store::{
    AuthUser, Community, Membership, NewCommunity, NewMembership, Profile, ProfileUpdate,
    Session, SignUpMetadata,
};
use tokio::sync::broadcast;

use crate::backend::{AuthEvent, Backend, AUTH_EVENT_CAPACITY};
use crate::error::ApiError;

#[cfg(not(target_arch = "wasm32"))]
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Cheap-to-clone handle; clones share the session and event channel.
#[derive(Clone)]
pub struct RestBackend {
    inner: Arc<Inner>,
}

struct Inner {
    http: Client,
    base_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
}

impl RestBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let base_url = config.url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ApiError::Config("backend url is empty".to_string()));
        }
        if config.anon_key.trim().is_empty() {
            tracing::warn!("No anon key configured, the backend will likely reject requests");
        }

        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(REQUEST_TIMEOUT);
        let http = builder
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                anon_key: config.anon_key.trim().to_string(),
                session: RwLock::new(None),
                events,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    fn current_session(&self) -> Option<Session> {
        self.inner.session.read().ok().and_then(|s| s.clone())
    }

    fn store_session(&self, session: Option<Session>) {
        match self.inner.session.write() {
            Ok(mut guard) => *guard = session,
            Err(e) => tracing::error!("Session lock poisoned: {e}"),
        }
    }

    fn emit(&self, event: AuthEvent) {
        // Err only means nobody is listening yet.
        let _ = self.inner.events.send(event);
    }

    /// Request with the `apikey` header and the best available bearer token.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let token = self
            .current_session()
            .map(|s| s.access_token)
            .unwrap_or_else(|| self.inner.anon_key.clone());
        self.inner
            .http
            .request(method, self.endpoint(path))
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(token)
    }
}

/// Pass successful responses through, turn the rest into [`ApiError::Http`].
async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Http {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

/// Human-readable message from an error body in any of the three dialects.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["msg", "message", "error_description", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(|m| m.as_str()).map(str::to_string))
        })
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status {status}"))
}

impl Backend for RestBackend {
    async fn get_session(&self) -> Result<Option<Session>, ApiError> {
        self.session_or_refresh().await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<AuthUser, ApiError> {
        self.auth_sign_up(email, password, metadata).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        self.auth_sign_in(email, password).await
    }

    async fn sign_out(&self) -> Result<(), ApiError> {
        self.auth_sign_out().await
    }

    async fn refresh_session(&self) -> Result<Session, ApiError> {
        self.auth_refresh().await
    }

    fn subscribe_auth(&self) -> broadcast::Receiver<AuthEvent> {
        self.inner.events.subscribe()
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Profile, ApiError> {
        self.select_profile(user_id).await
    }

    async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<(), ApiError> {
        self.patch_profile(user_id, update).await
    }

    async fn list_communities(&self) -> Result<Vec<Community>, ApiError> {
        self.select_communities().await
    }

    async fn fetch_community(&self, id: &str) -> Result<Option<Community>, ApiError> {
        self.select_community(id).await
    }

    async fn insert_community(&self, community: &NewCommunity) -> Result<Community, ApiError> {
        self.post_community(community).await
    }

    async fn count_members(&self, community_id: &str) -> Result<u64, ApiError> {
        self.count_membership_rows(community_id).await
    }

    async fn find_membership(
        &self,
        community_id: &str,
        user_id: &str,
    ) -> Result<Option<Membership>, ApiError> {
        self.select_membership(community_id, user_id).await
    }

    async fn insert_membership(&self, membership: &NewMembership) -> Result<Membership, ApiError> {
        self.post_membership(membership).await
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        upsert: bool,
    ) -> Result<(), ApiError> {
        self.put_object(bucket, path, bytes, content_type, upsert).await
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.object_public_url(bucket, path)
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool, ApiError> {
        self.get_bucket(bucket).await
    }

    async fn create_bucket(&self, bucket: &str, public: bool) -> Result<(), ApiError> {
        self.post_bucket(bucket, public).await
    }
}
