//! # API crate: the remote side of CreatorHub
//!
//! Everything that talks to the hosted backend lives here, behind the
//! [`Backend`] trait so the UI never depends on a concrete client.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`backend`] | The [`Backend`] trait and [`AuthEvent`] push notifications |
//! | [`rest`] | [`RestBackend`], the HTTP client for the hosted service |
//! | [`memory`] | [`MemoryBackend`], an in-process fake with failure injection |
//! | [`session`] | [`SessionStore`]: session, user and profile with the local cache |
//! | [`directory`] | Community list plus member counts, with stale-response guarding |
//! | [`forms`] | Community creation, profile edit, sign-up and join flows |
//! | [`uploads`] | Image upload paths and bucket bootstrap |
//! | [`retry`] | Bounded retry for transient read failures |

pub mod backend;
pub mod directory;
pub mod error;
pub mod forms;
pub mod memory;
pub mod rest;
pub mod retry;
pub mod session;
pub mod uploads;

pub use backend::{AuthEvent, Backend};
pub use directory::{fetch_community_detail, fetch_listings, CommunityDetail, DirectoryLoader};
pub use error::ApiError;
pub use forms::{create_community, join_community, save_profile, sign_up, FormError, JoinOutcome, SignUpOutcome};
pub use memory::{MemoryBackend, Operation};
pub use rest::RestBackend;
pub use retry::{with_retry, RetryPolicy};
pub use session::{SessionState, SessionStore};
pub use uploads::{ensure_bucket, upload_image};

pub use store::HubConfig;
