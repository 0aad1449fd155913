//! # Record schemas for the CreatorHub backend
//!
//! Every record that crosses the data-access boundary is decoded into one of
//! these types, so components downstream can rely on field presence and types
//! instead of poking at untyped JSON.
//!
//! | Struct | Table / source |
//! |--------|----------------|
//! | [`Profile`] | `profiles`, also the local profile snapshot |
//! | [`Community`] | `communities` |
//! | [`Membership`] | `community_members` |
//! | [`Session`] / [`AuthUser`] | auth service responses |
//!
//! Ids are kept as `String` so the types stay identical on native and WASM.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user display metadata. One row per user, keyed by the auth user id.
///
/// All fields default when missing: the local cache may hold a partial
/// snapshot and that must still decode.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Name to show in the navbar and profile header.
    pub fn display_name(&self) -> Option<&str> {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.username.as_deref().filter(|n| !n.trim().is_empty()))
    }

    /// Single uppercase letter for avatar placeholders.
    pub fn initial(&self) -> Option<char> {
        self.display_name()
            .and_then(|n| n.trim().chars().next())
            .map(|c| c.to_uppercase().next().unwrap_or(c))
    }
}

/// Fields a user may change on their own profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A community record as stored by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    /// Monthly fee; `None` means free.
    #[serde(default)]
    pub membership_fee: Option<f64>,
    /// Seat limit; `None` means unlimited.
    #[serde(default)]
    pub max_members: Option<u32>,
    #[serde(default)]
    pub rules: Option<String>,
    #[serde(default)]
    pub video_embed: Option<String>,
    pub creator_id: String,
    pub created_at: DateTime<Utc>,
}

impl Community {
    /// `src` of the stored video embed snippet, when it is an `https://` URL.
    ///
    /// The snippet itself is never rendered; only the extracted URL is placed
    /// into an iframe the app controls. A bare URL is accepted as well.
    pub fn video_src(&self) -> Option<String> {
        let embed = self.video_embed.as_deref()?.trim();
        let url = match embed.find("src=") {
            Some(idx) => {
                let rest = &embed[idx + 4..];
                let quote = rest.chars().next()?;
                if quote != '"' && quote != '\'' {
                    return None;
                }
                let rest = &rest[1..];
                &rest[..rest.find(quote)?]
            }
            None => embed,
        };
        let url = url.trim();
        let safe = url.starts_with("https://")
            && !url.contains(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == '<');
        safe.then(|| url.to_string())
    }
}

/// Payload for inserting a community. The backend assigns `id` and `created_at`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewCommunity {
    pub creator_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub banner_url: Option<String>,
    pub logo_url: Option<String>,
    pub membership_fee: Option<f64>,
    pub max_members: Option<u32>,
    pub rules: Option<String>,
    pub video_embed: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipRole {
    Creator,
    Member,
}

impl MembershipRole {
    pub fn label(self) -> &'static str {
        match self {
            MembershipRole::Creator => "Creator",
            MembershipRole::Member => "Member",
        }
    }
}

/// Association between a user and a community.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub id: String,
    pub community_id: String,
    pub user_id: String,
    pub role: MembershipRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewMembership {
    pub community_id: String,
    pub user_id: String,
    pub role: MembershipRole,
}

/// Identity returned by the auth service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// An authenticated session. Held in memory only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds) after which the access token is invalid.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

/// Metadata attached to a new account; the backend copies it into `profiles`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SignUpMetadata {
    pub full_name: String,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_profile_snapshot_decodes() {
        let profile: Profile =
            serde_json::from_str(r#"{"full_name":"Amal","username":"amal1"}"#).unwrap();
        assert_eq!(profile.id, "");
        assert_eq!(profile.display_name(), Some("Amal"));
        assert_eq!(profile.initial(), Some('A'));
        assert!(profile.avatar_url.is_none());
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let profile = Profile {
            full_name: Some("  ".to_string()),
            username: Some("amal1".to_string()),
            ..Profile::default()
        };
        assert_eq!(profile.display_name(), Some("amal1"));
        assert_eq!(Profile::default().display_name(), None);
    }

    #[test]
    fn test_community_row_decodes_with_nulls() {
        let row = r#"{
            "id": "c1",
            "name": "Rustaceans",
            "description": null,
            "category": "tech",
            "language": "english",
            "banner_url": null,
            "logo_url": null,
            "membership_fee": 9.99,
            "max_members": null,
            "rules": null,
            "video_embed": null,
            "creator_id": "u1",
            "created_at": "2024-03-01T10:00:00.123456+00:00"
        }"#;
        let community: Community = serde_json::from_str(row).unwrap();
        assert_eq!(community.name, "Rustaceans");
        assert_eq!(community.membership_fee, Some(9.99));
        assert!(community.max_members.is_none());
    }

    #[test]
    fn test_video_src_extraction() {
        let mut community: Community = serde_json::from_str(
            r#"{"id":"c","name":"n","creator_id":"u","created_at":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(community.video_src(), None);

        community.video_embed =
            Some(r#"<iframe width="560" src="https://www.youtube.com/embed/abc"></iframe>"#.to_string());
        assert_eq!(
            community.video_src().as_deref(),
            Some("https://www.youtube.com/embed/abc")
        );

        community.video_embed = Some("https://player.vimeo.com/video/1".to_string());
        assert_eq!(
            community.video_src().as_deref(),
            Some("https://player.vimeo.com/video/1")
        );

        community.video_embed = Some(r#"<iframe src="javascript:alert(1)"></iframe>"#.to_string());
        assert_eq!(community.video_src(), None);

        community.video_embed = Some(r#"<iframe src=http://x.test></iframe>"#.to_string());
        assert_eq!(community.video_src(), None);
    }

    #[test]
    fn test_membership_role_is_lowercase_on_the_wire() {
        let json = serde_json::to_string(&MembershipRole::Creator).unwrap();
        assert_eq!(json, "\"creator\"");
    }
}
