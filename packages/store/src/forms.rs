//! # Form drafts and client-side validation
//!
//! A draft holds exactly what the user typed, as strings. Validation turns a
//! draft into a backend payload or a [`ValidationError`] without touching the
//! network and without consuming the draft, so a failed submit leaves every
//! field intact.

use chrono::{DateTime, Utc};

use crate::models::{NewCommunity, ProfileUpdate, SignUpMetadata};

pub const PASSWORD_MIN_LEN: usize = 6;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Community name is required")]
    MissingName,
    #[error("Seat limit must be a positive whole number")]
    InvalidMaxMembers,
    #[error("Membership fee must be a number of zero or more")]
    InvalidFee,
    #[error("Please enter a valid email")]
    InvalidEmail,
    #[error("Password is required")]
    MissingPassword,
    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Full name is required")]
    MissingFullName,
    #[error("Username is required")]
    MissingUsername,
    #[error("Only image files can be uploaded")]
    NotAnImage,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg", "avif", "bmp"];

/// A file picked in a form, read fully into memory.
#[derive(Clone, PartialEq)]
pub struct ImageFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageFile {
    pub fn new(name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type,
            bytes,
        }
    }

    /// Lowercase extension taken from the file name, then from the MIME type.
    pub fn extension(&self) -> String {
        if let Some((_, ext)) = self.name.rsplit_once('.') {
            if !ext.is_empty() {
                return ext.to_lowercase();
            }
        }
        self.content_type
            .as_deref()
            .and_then(|mime| mime.strip_prefix("image/"))
            .map(|sub| sub.split('+').next().unwrap_or(sub).to_lowercase())
            .unwrap_or_else(|| "png".to_string())
    }

    /// MIME type sent with the upload.
    pub fn mime(&self) -> String {
        if let Some(mime) = self.content_type.as_deref().filter(|m| !m.is_empty()) {
            return mime.to_string();
        }
        match self.extension().as_str() {
            "jpg" | "jpeg" => "image/jpeg".to_string(),
            "svg" => "image/svg+xml".to_string(),
            ext if IMAGE_EXTENSIONS.contains(&ext) => format!("image/{ext}"),
            _ => "application/octet-stream".to_string(),
        }
    }

    pub fn is_image(&self) -> bool {
        match self.content_type.as_deref() {
            Some(mime) if !mime.is_empty() => mime.starts_with("image/"),
            _ => IMAGE_EXTENSIONS.contains(&self.extension().as_str()),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.is_image() {
            Ok(())
        } else {
            Err(ValidationError::NotAnImage)
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Input of the community creation form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommunityDraft {
    pub name: String,
    pub description: String,
    pub category: String,
    pub language: String,
    pub rules: String,
    /// Seat limit as typed; empty means unlimited.
    pub max_members: String,
    /// Monthly fee as typed; empty means free.
    pub membership_fee: String,
    pub video_embed: String,
    pub logo: Option<ImageFile>,
    pub banner: Option<ImageFile>,
}

impl CommunityDraft {
    /// Check every field and build the insert payload (image URLs unset).
    pub fn validate(&self, creator_id: &str) -> Result<NewCommunity, ValidationError> {
        let name = non_empty(&self.name).ok_or(ValidationError::MissingName)?;

        let max_members = match non_empty(&self.max_members) {
            None => None,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => Some(n),
                _ => return Err(ValidationError::InvalidMaxMembers),
            },
        };

        let membership_fee = match non_empty(&self.membership_fee) {
            None => None,
            Some(raw) => match raw.parse::<f64>() {
                Ok(fee) if fee.is_finite() && fee >= 0.0 => Some(fee),
                _ => return Err(ValidationError::InvalidFee),
            },
        };

        if let Some(logo) = &self.logo {
            logo.validate()?;
        }
        if let Some(banner) = &self.banner {
            banner.validate()?;
        }

        Ok(NewCommunity {
            creator_id: creator_id.to_string(),
            name,
            description: non_empty(&self.description),
            category: non_empty(&self.category),
            language: non_empty(&self.language),
            banner_url: None,
            logo_url: None,
            membership_fee,
            max_members,
            rules: non_empty(&self.rules),
            video_embed: non_empty(&self.video_embed),
        })
    }
}

/// Input of the profile form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileDraft {
    pub full_name: String,
    pub username: String,
    pub avatar: Option<ImageFile>,
}

impl ProfileDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(avatar) = &self.avatar {
            avatar.validate()?;
        }
        Ok(())
    }

    /// Update payload. `avatar_url` is only set when a new avatar was stored.
    pub fn to_update(&self, avatar_url: Option<String>, now: DateTime<Utc>) -> ProfileUpdate {
        ProfileUpdate {
            full_name: Some(self.full_name.trim().to_string()),
            username: Some(self.username.trim().to_string()),
            avatar_url,
            updated_at: Some(now),
        }
    }
}

/// Input of the sign-up form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SignUpDraft {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub avatar: Option<ImageFile>,
}

impl SignUpDraft {
    pub fn validate(&self) -> Result<SignUpMetadata, ValidationError> {
        let full_name = non_empty(&self.full_name).ok_or(ValidationError::MissingFullName)?;
        let username = non_empty(&self.username).ok_or(ValidationError::MissingUsername)?;
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::MissingPassword);
        }
        if self.password.chars().count() < PASSWORD_MIN_LEN {
            return Err(ValidationError::PasswordTooShort(PASSWORD_MIN_LEN));
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        if let Some(avatar) = &self.avatar {
            avatar.validate()?;
        }
        Ok(SignUpMetadata {
            full_name,
            username,
        })
    }

    pub fn email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

/// Input of the login form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SignInDraft {
    pub email: String,
    pub password: String,
}

impl SignInDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::MissingPassword);
        }
        Ok(())
    }

    pub fn email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidEmail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(name: &str) -> ImageFile {
        ImageFile::new(name, Some("image/png".to_string()), vec![1, 2, 3])
    }

    #[test]
    fn test_community_name_is_required() {
        let draft = CommunityDraft {
            name: "   ".to_string(),
            description: "keep me".to_string(),
            ..CommunityDraft::default()
        };
        assert_eq!(draft.validate("u1"), Err(ValidationError::MissingName));
        assert_eq!(draft.description, "keep me");
    }

    #[test]
    fn test_community_payload_trims_and_drops_blanks() {
        let draft = CommunityDraft {
            name: "  Rustaceans ".to_string(),
            category: "tech".to_string(),
            language: "english".to_string(),
            max_members: "50".to_string(),
            membership_fee: "4.5".to_string(),
            rules: " ".to_string(),
            ..CommunityDraft::default()
        };
        let payload = draft.validate("u1").unwrap();
        assert_eq!(payload.name, "Rustaceans");
        assert_eq!(payload.creator_id, "u1");
        assert_eq!(payload.max_members, Some(50));
        assert_eq!(payload.membership_fee, Some(4.5));
        assert!(payload.rules.is_none());
        assert!(payload.description.is_none());
    }

    #[test]
    fn test_community_numbers_are_checked() {
        let mut draft = CommunityDraft {
            name: "X".to_string(),
            max_members: "0".to_string(),
            ..CommunityDraft::default()
        };
        assert_eq!(draft.validate("u"), Err(ValidationError::InvalidMaxMembers));
        draft.max_members = "ten".to_string();
        assert_eq!(draft.validate("u"), Err(ValidationError::InvalidMaxMembers));
        draft.max_members.clear();
        draft.membership_fee = "-1".to_string();
        assert_eq!(draft.validate("u"), Err(ValidationError::InvalidFee));
    }

    #[test]
    fn test_non_image_upload_is_rejected() {
        let draft = CommunityDraft {
            name: "X".to_string(),
            logo: Some(ImageFile::new("notes.pdf", Some("application/pdf".to_string()), vec![])),
            ..CommunityDraft::default()
        };
        assert_eq!(draft.validate("u"), Err(ValidationError::NotAnImage));
    }

    #[test]
    fn test_image_extension_and_mime() {
        assert_eq!(png("Photo.PNG").extension(), "png");
        let no_ext = ImageFile::new("avatar", Some("image/svg+xml".to_string()), vec![]);
        assert_eq!(no_ext.extension(), "svg");
        assert_eq!(no_ext.mime(), "image/svg+xml");
        let guessed = ImageFile::new("me.jpg", None, vec![]);
        assert_eq!(guessed.mime(), "image/jpeg");
        assert!(guessed.is_image());
        assert!(!ImageFile::new("run.exe", None, vec![]).is_image());
    }

    #[test]
    fn test_sign_up_rules() {
        let mut draft = SignUpDraft {
            full_name: "Amal".to_string(),
            username: "amal1".to_string(),
            email: "amal@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret2".to_string(),
            avatar: None,
        };
        assert_eq!(draft.validate(), Err(ValidationError::PasswordMismatch));

        draft.confirm_password = "secret1".to_string();
        let metadata = draft.validate().unwrap();
        assert_eq!(metadata.full_name, "Amal");

        draft.password = "abc".to_string();
        draft.confirm_password = "abc".to_string();
        assert_eq!(draft.validate(), Err(ValidationError::PasswordTooShort(6)));

        draft.email = "not-an-email".to_string();
        assert_eq!(draft.validate(), Err(ValidationError::InvalidEmail));

        draft.username.clear();
        assert_eq!(draft.validate(), Err(ValidationError::MissingUsername));
    }

    #[test]
    fn test_sign_in_requires_both_fields() {
        let mut draft = SignInDraft {
            email: " Amal@Example.com ".to_string(),
            password: String::new(),
        };
        assert_eq!(draft.validate(), Err(ValidationError::MissingPassword));
        draft.password = "x".to_string();
        assert!(draft.validate().is_ok());
        assert_eq!(draft.email(), "amal@example.com");
    }

    #[test]
    fn test_profile_update_payload() {
        let draft = ProfileDraft {
            full_name: " Amal ".to_string(),
            username: "amal1".to_string(),
            avatar: Some(png("a.png")),
        };
        assert!(draft.validate().is_ok());
        let now = Utc::now();
        let update = draft.to_update(None, now);
        assert_eq!(update.full_name.as_deref(), Some("Amal"));
        assert!(update.avatar_url.is_none());
        assert_eq!(update.updated_at, Some(now));
    }
}
