//! This crate contains all shared UI for the workspace.

use dioxus::prelude::*;

pub mod components;

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

mod platform;
pub use platform::{make_backend, make_cache, scroll_to_top, CacheStore};

pub const CREATORHUB_CSS: Asset = asset!("/assets/creatorhub.css");

mod session;
pub use session::{use_hub, use_session, AppStore, Hub, SessionProvider};

pub mod toast;
pub use toast::{push_toast, use_toasts, ToastLevel, ToastProvider};

mod navbar;
pub use navbar::{Navbar, UserMenu};

mod hero;
pub use hero::Hero;

mod markdown;
pub use markdown::{render_markdown, Markdown};

mod category_icon;
pub use category_icon::CategoryIconView;

pub mod directory;
pub use directory::{use_directory_filters, DirectoryProvider};

mod filter_section;
pub use filter_section::FilterSection;

mod community_card;
pub use community_card::CommunityCard;

mod communities_list;
pub use communities_list::{CommunitiesList, Pagination};

mod image_picker;
pub use image_picker::{ImagePicker, PickedImage};

mod community_form;
pub use community_form::CommunityForm;

mod profile;
pub use profile::{ProfileAvatar, ProfileForm};
