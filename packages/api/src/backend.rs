//! # The remote data client contract
//!
//! [`Backend`] lists every capability the app needs from the hosted
//! backend-as-a-service. Two implementations exist:
//!
//! - [`crate::RestBackend`]: HTTP client for the Supabase-style REST dialect.
//! - [`crate::MemoryBackend`]: in-process fake for tests and offline demos.
//!
//! All calls are async and fallible. Auth state transitions are pushed to
//! subscribers as [`AuthEvent`]s over a broadcast channel.

use std::future::Future;

use store::{
    AuthUser, Community, Membership, NewCommunity, NewMembership, Profile, ProfileUpdate,
    Session, SignUpMetadata,
};
use tokio::sync::broadcast;

use crate::error::ApiError;

/// Push notification of an auth state transition.
#[derive(Clone, Debug, PartialEq)]
pub enum AuthEvent {
    SignedIn(Session),
    TokenRefreshed(Session),
    UserUpdated(Session),
    SignedOut,
}

impl AuthEvent {
    /// The session carried by signed-in style events.
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthEvent::SignedIn(s) | AuthEvent::TokenRefreshed(s) | AuthEvent::UserUpdated(s) => {
                Some(s)
            }
            AuthEvent::SignedOut => None,
        }
    }
}

/// Capacity of the auth event channel.
pub(crate) const AUTH_EVENT_CAPACITY: usize = 16;

/// Async interface to records, auth and object storage.
pub trait Backend {
    // Auth

    /// The current session, if any.
    fn get_session(&self) -> impl Future<Output = Result<Option<Session>, ApiError>>;

    /// Create an account. The backend creates the matching profile row from
    /// `metadata`.
    fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> impl Future<Output = Result<AuthUser, ApiError>>;

    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, ApiError>>;

    fn sign_out(&self) -> impl Future<Output = Result<(), ApiError>>;

    /// Exchange the refresh token for a new session.
    fn refresh_session(&self) -> impl Future<Output = Result<Session, ApiError>>;

    /// Receive every auth transition from now on.
    fn subscribe_auth(&self) -> broadcast::Receiver<AuthEvent>;

    // Records

    fn fetch_profile(&self, user_id: &str) -> impl Future<Output = Result<Profile, ApiError>>;

    fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> impl Future<Output = Result<(), ApiError>>;

    fn list_communities(&self) -> impl Future<Output = Result<Vec<Community>, ApiError>>;

    fn fetch_community(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Community>, ApiError>>;

    fn insert_community(
        &self,
        community: &NewCommunity,
    ) -> impl Future<Output = Result<Community, ApiError>>;

    /// Number of membership rows for a community.
    fn count_members(&self, community_id: &str) -> impl Future<Output = Result<u64, ApiError>>;

    fn find_membership(
        &self,
        community_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<Membership>, ApiError>>;

    fn insert_membership(
        &self,
        membership: &NewMembership,
    ) -> impl Future<Output = Result<Membership, ApiError>>;

    // Storage

    /// Store `bytes` at `bucket/path`. With `upsert` an existing object is
    /// overwritten, otherwise the call fails.
    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        upsert: bool,
    ) -> impl Future<Output = Result<(), ApiError>>;

    /// Public URL of a stored object. Pure, no network.
    fn public_url(&self, bucket: &str, path: &str) -> String;

    fn bucket_exists(&self, bucket: &str) -> impl Future<Output = Result<bool, ApiError>>;

    fn create_bucket(
        &self,
        bucket: &str,
        public: bool,
    ) -> impl Future<Output = Result<(), ApiError>>;
}
