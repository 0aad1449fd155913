//! Domain layer shared by every CreatorHub crate: record schemas, the
//! directory filter/pagination pipeline, form drafts, configuration and the
//! local key/value cache.

pub mod cache;
pub mod config;
pub mod directory;
pub mod forms;
pub mod models;

mod memory;
pub use memory::MemoryStore;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod local;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use local::LocalStore;

pub use cache::{KeyValueStore, ProfileCache, PROFILE_CACHE_KEY};
pub use config::HubConfig;
pub use directory::{DirectoryView, FilterState, Listing, PageView, RequestGeneration, Ticket};
pub use forms::{
    CommunityDraft, ImageFile, ProfileDraft, SignInDraft, SignUpDraft, ValidationError,
};
pub use models::{
    AuthUser, Community, Membership, MembershipRole, NewCommunity, NewMembership, Profile,
    ProfileUpdate, Session, SignUpMetadata,
};
