//! In-process [`Backend`] used by tests and the offline demo mode.
//!
//! Besides behaving like the hosted service it can:
//! - fail the next N calls of an [`Operation`] with a chosen error,
//! - count calls per operation,
//! - hold calls of an operation until the test releases them.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use store::config::StorageConfig;
use store::{
    AuthUser, Community, Membership, NewCommunity, NewMembership, Profile, ProfileUpdate,
    Session, SignUpMetadata,
};
use tokio::sync::{broadcast, Notify};

use crate::backend::{AuthEvent, Backend, AUTH_EVENT_CAPACITY};
use crate::error::ApiError;

/// One [`Backend`] method, for failure injection and call accounting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    GetSession,
    SignUp,
    SignIn,
    SignOut,
    RefreshSession,
    FetchProfile,
    UpdateProfile,
    ListCommunities,
    FetchCommunity,
    InsertCommunity,
    CountMembers,
    FindMembership,
    InsertMembership,
    Upload,
    BucketExists,
    CreateBucket,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

struct Account {
    user: AuthUser,
    password: String,
}

#[derive(Default)]
struct State {
    accounts: HashMap<String, Account>,
    profiles: HashMap<String, Profile>,
    communities: Vec<Community>,
    memberships: Vec<Membership>,
    objects: HashMap<(String, String), StoredObject>,
    buckets: HashSet<String>,
    session: Option<Session>,
    failures: HashMap<Operation, VecDeque<ApiError>>,
    calls: HashMap<Operation, usize>,
    gates: HashMap<Operation, Arc<Notify>>,
    next_id: u64,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn new_session(&mut self, user: AuthUser) -> Session {
        Session {
            access_token: self.next_id("token"),
            refresh_token: Some(self.next_id("refresh")),
            expires_at: Some(Utc::now().timestamp() + 3600),
            user,
        }
    }
}

/// Shared-state fake; clones see the same data.
#[derive(Clone)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
    events: broadcast::Sender<AuthEvent>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Empty backend with the default avatar and community buckets.
    pub fn new() -> Self {
        let storage = StorageConfig::default();
        let state = State {
            buckets: HashSet::from([storage.avatars_bucket, storage.community_bucket]),
            ..State::default()
        };
        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(state)),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count the call, wait at the gate if one is set, then pop any injected
    /// failure.
    async fn enter(&self, op: Operation) -> Result<(), ApiError> {
        let gate = {
            let mut state = self.lock();
            *state.calls.entry(op).or_default() += 1;
            state.gates.get(&op).cloned()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match self.lock().failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn emit(&self, event: AuthEvent) {
        let _ = self.events.send(event);
    }

    // Failure injection and accounting

    /// Fail the next call of `op` with `error`. Calls stack up in order.
    pub fn fail_next(&self, op: Operation, error: ApiError) {
        self.fail_times(op, error, 1);
    }

    pub fn fail_times(&self, op: Operation, error: ApiError, times: usize) {
        let mut state = self.lock();
        let queue = state.failures.entry(op).or_default();
        queue.extend(std::iter::repeat(error).take(times));
    }

    pub fn calls(&self, op: Operation) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().sum()
    }

    /// Make every call of `op` wait for a permit on the returned [`Notify`].
    pub fn hold(&self, op: Operation) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock().gates.insert(op, gate.clone());
        gate
    }

    /// Stop holding calls of `op`; calls already waiting still need a permit.
    pub fn release(&self, op: Operation) {
        self.lock().gates.remove(&op);
    }

    /// Push an auth event to subscribers as the hosted service would.
    pub fn push_event(&self, event: AuthEvent) {
        self.emit(event);
    }

    // Seeding and inspection

    /// Register an account and its profile row without signing in.
    pub fn add_account(&self, email: &str, password: &str, full_name: &str) -> AuthUser {
        let mut state = self.lock();
        let user = AuthUser {
            id: state.next_id("user"),
            email: Some(email.to_string()),
        };
        state.profiles.insert(
            user.id.clone(),
            Profile {
                id: user.id.clone(),
                full_name: Some(full_name.to_string()),
                ..Profile::default()
            },
        );
        state.accounts.insert(
            email.to_string(),
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        user
    }

    /// Hold a session for `user` without emitting an event, as if restored
    /// by the hosted client on page load.
    pub fn restore_session(&self, user: AuthUser) -> Session {
        let mut state = self.lock();
        let session = state.new_session(user);
        state.session = Some(session.clone());
        session
    }

    pub fn session(&self) -> Option<Session> {
        self.lock().session.clone()
    }

    pub fn profile(&self, user_id: &str) -> Option<Profile> {
        self.lock().profiles.get(user_id).cloned()
    }

    pub fn add_community(&self, community: NewCommunity) -> Community {
        let mut state = self.lock();
        let id = state.next_id("community");
        let community = community_row(id, community);
        state.communities.push(community.clone());
        community
    }

    pub fn communities(&self) -> Vec<Community> {
        self.lock().communities.clone()
    }

    pub fn add_member(&self, community_id: &str, user_id: &str) {
        let mut state = self.lock();
        let id = state.next_id("member");
        state.memberships.push(Membership {
            id,
            community_id: community_id.to_string(),
            user_id: user_id.to_string(),
            role: store::MembershipRole::Member,
            joined_at: Utc::now(),
        });
    }

    pub fn object(&self, bucket: &str, path: &str) -> Option<StoredObject> {
        self.lock()
            .objects
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    pub fn object_count(&self) -> usize {
        self.lock().objects.len()
    }

    pub fn remove_bucket(&self, bucket: &str) {
        self.lock().buckets.remove(bucket);
    }
}

fn community_row(id: String, new: NewCommunity) -> Community {
    Community {
        id,
        name: new.name,
        description: new.description,
        category: new.category,
        language: new.language,
        banner_url: new.banner_url,
        logo_url: new.logo_url,
        membership_fee: new.membership_fee,
        max_members: new.max_members,
        rules: new.rules,
        video_embed: new.video_embed,
        creator_id: new.creator_id,
        created_at: Utc::now(),
    }
}

impl Backend for MemoryBackend {
    async fn get_session(&self) -> Result<Option<Session>, ApiError> {
        self.enter(Operation::GetSession).await?;
        Ok(self.session())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<AuthUser, ApiError> {
        self.enter(Operation::SignUp).await?;
        let session = {
            let mut state = self.lock();
            if state.accounts.contains_key(email) {
                return Err(ApiError::Auth("User already registered".to_string()));
            }
            let user = AuthUser {
                id: state.next_id("user"),
                email: Some(email.to_string()),
            };
            state.profiles.insert(
                user.id.clone(),
                Profile {
                    id: user.id.clone(),
                    full_name: Some(metadata.full_name.clone()),
                    username: Some(metadata.username.clone()),
                    ..Profile::default()
                },
            );
            state.accounts.insert(
                email.to_string(),
                Account {
                    user: user.clone(),
                    password: password.to_string(),
                },
            );
            let session = state.new_session(user);
            state.session = Some(session.clone());
            session
        };
        let user = session.user.clone();
        self.emit(AuthEvent::SignedIn(session));
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        self.enter(Operation::SignIn).await?;
        let session = {
            let mut state = self.lock();
            let user = match state.accounts.get(email) {
                Some(account) if account.password == password => account.user.clone(),
                _ => return Err(ApiError::Auth("Invalid login credentials".to_string())),
            };
            let session = state.new_session(user);
            state.session = Some(session.clone());
            session
        };
        self.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), ApiError> {
        self.enter(Operation::SignOut).await?;
        self.lock().session = None;
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }

    async fn refresh_session(&self) -> Result<Session, ApiError> {
        self.enter(Operation::RefreshSession).await?;
        let session = {
            let mut state = self.lock();
            let user = state
                .session
                .as_ref()
                .map(|s| s.user.clone())
                .ok_or(ApiError::NotAuthenticated)?;
            let session = state.new_session(user);
            state.session = Some(session.clone());
            session
        };
        self.emit(AuthEvent::TokenRefreshed(session.clone()));
        Ok(session)
    }

    fn subscribe_auth(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Profile, ApiError> {
        self.enter(Operation::FetchProfile).await?;
        self.profile(user_id)
            .ok_or_else(|| ApiError::NotFound("Profile".to_string()))
    }

    async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<(), ApiError> {
        self.enter(Operation::UpdateProfile).await?;
        let mut state = self.lock();
        let profile = state
            .profiles
            .get_mut(user_id)
            .ok_or_else(|| ApiError::NotFound("Profile".to_string()))?;
        if let Some(full_name) = &update.full_name {
            profile.full_name = Some(full_name.clone());
        }
        if let Some(username) = &update.username {
            profile.username = Some(username.clone());
        }
        if let Some(avatar_url) = &update.avatar_url {
            profile.avatar_url = Some(avatar_url.clone());
        }
        if update.updated_at.is_some() {
            profile.updated_at = update.updated_at;
        }
        Ok(())
    }

    async fn list_communities(&self) -> Result<Vec<Community>, ApiError> {
        self.enter(Operation::ListCommunities).await?;
        let mut communities = self.communities();
        // Newest first; insertion order breaks ties.
        communities.reverse();
        communities.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(communities)
    }

    async fn fetch_community(&self, id: &str) -> Result<Option<Community>, ApiError> {
        self.enter(Operation::FetchCommunity).await?;
        Ok(self.lock().communities.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_community(&self, community: &NewCommunity) -> Result<Community, ApiError> {
        self.enter(Operation::InsertCommunity).await?;
        Ok(self.add_community(community.clone()))
    }

    async fn count_members(&self, community_id: &str) -> Result<u64, ApiError> {
        self.enter(Operation::CountMembers).await?;
        let state = self.lock();
        let count = state
            .memberships
            .iter()
            .filter(|m| m.community_id == community_id)
            .count();
        Ok(count as u64)
    }

    async fn find_membership(
        &self,
        community_id: &str,
        user_id: &str,
    ) -> Result<Option<Membership>, ApiError> {
        self.enter(Operation::FindMembership).await?;
        Ok(self
            .lock()
            .memberships
            .iter()
            .find(|m| m.community_id == community_id && m.user_id == user_id)
            .cloned())
    }

    async fn insert_membership(&self, membership: &NewMembership) -> Result<Membership, ApiError> {
        self.enter(Operation::InsertMembership).await?;
        let mut state = self.lock();
        let duplicate = state
            .memberships
            .iter()
            .any(|m| m.community_id == membership.community_id && m.user_id == membership.user_id);
        if duplicate {
            return Err(ApiError::Http {
                status: 409,
                message: "duplicate key value violates unique constraint".to_string(),
            });
        }
        let row = Membership {
            id: state.next_id("member"),
            community_id: membership.community_id.clone(),
            user_id: membership.user_id.clone(),
            role: membership.role,
            joined_at: Utc::now(),
        };
        state.memberships.push(row.clone());
        Ok(row)
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        upsert: bool,
    ) -> Result<(), ApiError> {
        self.enter(Operation::Upload).await?;
        let mut state = self.lock();
        if !state.buckets.contains(bucket) {
            return Err(ApiError::NotFound("Bucket".to_string()));
        }
        let key = (bucket.to_string(), path.to_string());
        if !upsert && state.objects.contains_key(&key) {
            return Err(ApiError::Http {
                status: 409,
                message: "The resource already exists".to_string(),
            });
        }
        state.objects.insert(
            key,
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://storage/{bucket}/{path}")
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool, ApiError> {
        self.enter(Operation::BucketExists).await?;
        Ok(self.lock().buckets.contains(bucket))
    }

    async fn create_bucket(&self, bucket: &str, _public: bool) -> Result<(), ApiError> {
        self.enter(Operation::CreateBucket).await?;
        if !self.lock().buckets.insert(bucket.to_string()) {
            return Err(ApiError::Http {
                status: 409,
                message: "The resource already exists".to_string(),
            });
        }
        Ok(())
    }
}
