//! # Session and profile store
//!
//! [`SessionStore`] is the single source of truth for "who is signed in and
//! what does their profile look like". Consumers read a [`SessionState`]
//! snapshot or subscribe to changes through a `watch` channel.
//!
//! ## Lifecycle
//!
//! 1. **Construction** seeds the profile from the local cache so the first
//!    paint can show the user's name before any network traffic.
//! 2. **[`run`](SessionStore::run)** subscribes to auth events *before*
//!    checking for an existing session, so a sign-in racing startup is never
//!    missed, then handles events until the channel closes.
//! 3. **Sign-out** is fail-closed: a failed backend call leaves the session
//!    untouched; a successful one clears session, user, profile and cache.
//!
//! Every identity change bumps an epoch. A profile fetch started under an
//! older epoch is discarded on arrival, so a slow fetch can never repopulate
//! state after the user has signed out.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use store::{AuthUser, KeyValueStore, Profile, ProfileCache, Session};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;

use crate::backend::{AuthEvent, Backend};
use crate::error::ApiError;
use crate::retry::{with_retry, RetryPolicy};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    pub session: Option<Session>,
    pub user: Option<AuthUser>,
    /// May be a cached snapshot while `user` is still unknown.
    pub profile: Option<Profile>,
    /// True until the startup session check has settled.
    pub loading: bool,
}

impl SessionState {
    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }
}

pub struct SessionStore<B, S: KeyValueStore> {
    inner: Arc<Inner<B, S>>,
}

impl<B, S: KeyValueStore> Clone for SessionStore<B, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

struct Inner<B, S: KeyValueStore> {
    backend: B,
    cache: ProfileCache<S>,
    retry: RetryPolicy,
    state: watch::Sender<SessionState>,
    epoch: AtomicU64,
}

impl<B: Backend, S: KeyValueStore> SessionStore<B, S> {
    pub fn new(backend: B, cache_store: S, retry: RetryPolicy) -> Self {
        let cache = ProfileCache::new(cache_store);
        let profile = cache.load();
        if profile.is_some() {
            tracing::debug!("Seeded profile from local cache");
        }
        let (state, _) = watch::channel(SessionState {
            session: None,
            user: None,
            profile,
            loading: true,
        });
        Self {
            inner: Arc::new(Inner {
                backend,
                cache,
                retry,
                state,
                epoch: AtomicU64::new(0),
            }),
        }
    }

    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    /// Whether both handles point at the same store.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Initialize, then follow auth events until the backend drops the
    /// channel.
    pub async fn run(&self) {
        let mut events = self.inner.backend.subscribe_auth();
        self.initialize().await;
        loop {
            match events.recv().await {
                Ok(event) => self.handle_auth_event(event).await,
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!("Missed {missed} auth events, resyncing session");
                    self.resync().await;
                }
                Err(RecvError::Closed) => {
                    tracing::debug!("Auth event channel closed");
                    break;
                }
            }
        }
    }

    /// Check for an existing session and load its profile. Always ends with
    /// `loading == false`; failures leave the store signed out and keep any
    /// cached profile.
    pub async fn initialize(&self) {
        let backend = &self.inner.backend;
        match with_retry(self.inner.retry, "session check", || backend.get_session()).await {
            Ok(Some(session)) => {
                tracing::info!("Restored session for {}", session.user.id);
                if self.adopt(session) {
                    self.load_profile().await;
                }
            }
            Ok(None) => tracing::debug!("No active session"),
            Err(e) => tracing::warn!("Session check failed, continuing signed out: {e}"),
        }
        self.inner.state.send_modify(|state| state.loading = false);
    }

    pub async fn handle_auth_event(&self, event: AuthEvent) {
        match event.session() {
            Some(session) => {
                if self.adopt(session.clone()) {
                    self.load_profile().await;
                }
            }
            None => {
                tracing::info!("Signed out");
                self.clear();
            }
        }
    }

    /// Re-read the profile of the current user, e.g. after an edit.
    pub async fn refresh_profile(&self) {
        self.load_profile().await;
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let session = self.inner.backend.sign_in(email, password).await?;
        tracing::info!("Signed in as {}", session.user.id);
        if self.adopt(session) {
            self.load_profile().await;
        }
        Ok(())
    }

    /// Fail-closed: local state is only cleared once the backend confirms.
    pub async fn sign_out(&self) -> Result<(), ApiError> {
        self.inner.backend.sign_out().await?;
        self.clear();
        Ok(())
    }

    async fn resync(&self) {
        match self.inner.backend.get_session().await {
            Ok(Some(session)) => {
                if self.adopt(session) {
                    self.load_profile().await;
                }
            }
            Ok(None) => {
                if self.snapshot().is_signed_in() {
                    self.clear();
                }
            }
            Err(e) => tracing::warn!("Session resync failed: {e}"),
        }
    }

    /// Install `session`. Returns false when it is the one already held.
    fn adopt(&self, session: Session) -> bool {
        let epoch = &self.inner.epoch;
        self.inner.state.send_if_modified(|state| {
            let same = state
                .session
                .as_ref()
                .is_some_and(|s| s.access_token == session.access_token);
            if same {
                return false;
            }
            epoch.fetch_add(1, Ordering::SeqCst);
            let other_user = state
                .profile
                .as_ref()
                .is_some_and(|p| !p.id.is_empty() && p.id != session.user.id);
            if other_user {
                state.profile = None;
            }
            state.user = Some(session.user.clone());
            state.session = Some(session);
            true
        })
    }

    fn clear(&self) {
        let inner = &self.inner;
        inner.state.send_modify(|state| {
            inner.epoch.fetch_add(1, Ordering::SeqCst);
            state.session = None;
            state.user = None;
            state.profile = None;
            inner.cache.clear();
        });
    }

    async fn load_profile(&self) {
        let (epoch, user_id) = {
            let state = self.inner.state.borrow();
            match state.user_id() {
                Some(id) => (self.inner.epoch.load(Ordering::SeqCst), id.to_string()),
                None => return,
            }
        };

        let backend = &self.inner.backend;
        let fetched = with_retry(self.inner.retry, "profile fetch", || {
            backend.fetch_profile(&user_id)
        })
        .await;

        let profile = match fetched {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("Failed to fetch profile for {user_id}: {e}");
                return;
            }
        };

        let inner = &self.inner;
        let applied = inner.state.send_if_modified(|state| {
            let current = inner.epoch.load(Ordering::SeqCst) == epoch
                && state.user_id() == Some(user_id.as_str());
            if !current {
                return false;
            }
            inner.cache.save(&profile);
            state.profile = Some(profile);
            true
        });
        if !applied {
            tracing::debug!("Discarded profile for {user_id}, session changed while loading");
        }
    }
}
