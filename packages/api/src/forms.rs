//! # Form submissions
//!
//! Each flow validates its draft first and makes no network call when
//! validation fails. Image uploads happen on submit, before the record
//! write. If the upload succeeds and the write fails, the result is
//! [`FormError::PartialFailure`] naming the object left behind.

use chrono::Utc;
use store::config::StorageConfig;
use store::{
    AuthUser, Community, CommunityDraft, Membership, MembershipRole, NewMembership, ProfileDraft,
    ProfileUpdate, SignUpDraft, ValidationError,
};

use crate::backend::Backend;
use crate::error::ApiError;
use crate::uploads::{
    avatar_path, community_image_path, now_millis, upload_image, ImageSlot,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Please sign in first")]
    NotSignedIn,

    #[error("This community is full")]
    CommunityFull,

    #[error(transparent)]
    Api(#[from] ApiError),

    /// Upload went through, the record write did not.
    #[error("Image uploaded to {object_path} but saving failed: {source}")]
    PartialFailure {
        object_path: String,
        #[source]
        source: ApiError,
    },
}

impl FormError {
    /// Whether the user can fix this by editing the form.
    pub fn is_validation(&self) -> bool {
        matches!(self, FormError::Validation(_))
    }
}

/// Wrap a write failure, noting any objects already uploaded.
fn write_failed(uploaded: &[String], source: ApiError) -> FormError {
    if uploaded.is_empty() {
        return FormError::Api(source);
    }
    let object_path = uploaded.join(", ");
    tracing::warn!("Record write failed, orphaned uploads: {object_path}");
    FormError::PartialFailure {
        object_path,
        source,
    }
}

/// Validate, upload logo and banner, then insert the community row.
///
/// The creator owns the community implicitly through `creator_id`; no
/// membership row is written.
pub async fn create_community<B: Backend>(
    backend: &B,
    storage: &StorageConfig,
    user: Option<&AuthUser>,
    draft: &CommunityDraft,
) -> Result<Community, FormError> {
    let user = user.ok_or(FormError::NotSignedIn)?;
    let mut payload = draft.validate(&user.id)?;

    let stamp = now_millis();
    let bucket = storage.community_bucket.as_str();
    let mut uploaded = Vec::new();
    if let Some(logo) = &draft.logo {
        let path = community_image_path(ImageSlot::Logo, logo, stamp);
        payload.logo_url = Some(upload_image(backend, bucket, &path, logo, true).await?);
        uploaded.push(path);
    }
    if let Some(banner) = &draft.banner {
        let path = community_image_path(ImageSlot::Banner, banner, stamp);
        let url = upload_image(backend, bucket, &path, banner, true)
            .await
            .map_err(|e| write_failed(&uploaded, e))?;
        payload.banner_url = Some(url);
        uploaded.push(path);
    }

    let community = backend
        .insert_community(&payload)
        .await
        .map_err(|e| write_failed(&uploaded, e))?;
    tracing::info!("Created community {} ({})", community.name, community.id);
    Ok(community)
}

/// Validate, upload the avatar if one was picked, then update the profile.
/// Returns the update that was written.
pub async fn save_profile<B: Backend>(
    backend: &B,
    storage: &StorageConfig,
    user_id: &str,
    draft: &ProfileDraft,
) -> Result<ProfileUpdate, FormError> {
    draft.validate()?;

    let mut uploaded = Vec::new();
    let avatar_url = match &draft.avatar {
        Some(file) => {
            let path = avatar_path(user_id, file);
            let url = upload_image(backend, &storage.avatars_bucket, &path, file, true).await?;
            uploaded.push(path);
            Some(url)
        }
        None => None,
    };

    let update = draft.to_update(avatar_url, Utc::now());
    backend
        .update_profile(user_id, &update)
        .await
        .map_err(|e| write_failed(&uploaded, e))?;
    tracing::info!("Profile {user_id} updated");
    Ok(update)
}

/// Result of a sign-up. The account exists even when `avatar_error` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpOutcome {
    pub user: AuthUser,
    pub avatar_error: Option<FormError>,
}

/// Validate, create the account, then attach the avatar if one was picked.
///
/// Avatar problems after the account exists are reported in the outcome
/// rather than as an error, since resubmitting would hit "already
/// registered".
pub async fn sign_up<B: Backend>(
    backend: &B,
    storage: &StorageConfig,
    draft: &SignUpDraft,
) -> Result<SignUpOutcome, FormError> {
    let metadata = draft.validate()?;
    let user = backend
        .sign_up(&draft.email(), &draft.password, &metadata)
        .await?;

    let avatar_error = match &draft.avatar {
        Some(file) => {
            let path = avatar_path(&user.id, file);
            let attached = match upload_image(backend, &storage.avatars_bucket, &path, file, true).await
            {
                Ok(url) => {
                    let update = ProfileUpdate {
                        full_name: Some(metadata.full_name.clone()),
                        username: Some(metadata.username.clone()),
                        avatar_url: Some(url),
                        updated_at: Some(Utc::now()),
                    };
                    backend
                        .update_profile(&user.id, &update)
                        .await
                        .map_err(|e| write_failed(&[path], e))
                }
                Err(e) => Err(FormError::Api(e)),
            };
            attached.err()
        }
        None => None,
    };
    if let Some(e) = &avatar_error {
        tracing::warn!("Account {} created without avatar: {e}", user.id);
    }
    Ok(SignUpOutcome { user, avatar_error })
}

#[derive(Debug, Clone, PartialEq)]
pub enum JoinOutcome {
    Joined(Membership),
    AlreadyMember(Membership),
}

/// Add `user` to `community` unless already a member. Respects the seat
/// limit; the creator joins with the creator role.
pub async fn join_community<B: Backend>(
    backend: &B,
    user: Option<&AuthUser>,
    community: &Community,
) -> Result<JoinOutcome, FormError> {
    let user = user.ok_or(FormError::NotSignedIn)?;
    if let Some(existing) = backend.find_membership(&community.id, &user.id).await? {
        return Ok(JoinOutcome::AlreadyMember(existing));
    }
    if let Some(max) = community.max_members {
        let members = backend.count_members(&community.id).await?;
        if members >= u64::from(max) {
            return Err(FormError::CommunityFull);
        }
    }
    let role = if user.id == community.creator_id {
        MembershipRole::Creator
    } else {
        MembershipRole::Member
    };
    let membership = backend
        .insert_membership(&NewMembership {
            community_id: community.id.clone(),
            user_id: user.id.clone(),
            role,
        })
        .await?;
    tracing::info!("{} joined {}", user.id, community.id);
    Ok(JoinOutcome::Joined(membership))
}

#[cfg(test)]
mod tests {
    use store::ImageFile;

    use super::*;
    use crate::memory::{MemoryBackend, Operation};

    fn user(id: &str) -> AuthUser {
        AuthUser {
            id: id.to_string(),
            email: Some(format!("{id}@example.com")),
        }
    }

    fn png(name: &str) -> ImageFile {
        ImageFile::new(name, Some("image/png".to_string()), vec![1, 2, 3])
    }

    fn draft(name: &str) -> CommunityDraft {
        CommunityDraft {
            name: name.to_string(),
            category: "tech".to_string(),
            language: "english".to_string(),
            max_members: "50".to_string(),
            ..CommunityDraft::default()
        }
    }

    #[tokio::test]
    async fn test_blank_name_makes_no_calls() {
        let backend = MemoryBackend::new();
        let mut form = draft("   ");
        form.logo = Some(png("logo.png"));

        let err = create_community(&backend, &StorageConfig::default(), Some(&user("u1")), &form)
            .await
            .unwrap_err();

        assert_eq!(err, FormError::Validation(ValidationError::MissingName));
        assert!(err.is_validation());
        assert_eq!(backend.total_calls(), 0);
        assert_eq!(form.name, "   ");
        assert!(form.logo.is_some());
    }

    #[tokio::test]
    async fn test_anonymous_create_is_refused() {
        let backend = MemoryBackend::new();
        let err = create_community(&backend, &StorageConfig::default(), None, &draft("Rustaceans"))
            .await
            .unwrap_err();
        assert_eq!(err, FormError::NotSignedIn);
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_create_with_images() {
        let backend = MemoryBackend::new();
        let mut form = draft("Rustaceans");
        form.logo = Some(png("logo.png"));
        form.banner = Some(png("banner.jpg"));

        let community = create_community(&backend, &StorageConfig::default(), Some(&user("u1")), &form)
            .await
            .unwrap();

        assert_eq!(community.creator_id, "u1");
        assert_eq!(community.max_members, Some(50));
        let logo = community.logo_url.unwrap();
        let banner = community.banner_url.unwrap();
        assert!(logo.starts_with("memory://storage/community-images/logo-"));
        assert!(banner.ends_with(".jpg"));
        assert_eq!(backend.object_count(), 2);
        assert_eq!(backend.calls(Operation::InsertMembership), 0);
    }

    #[tokio::test]
    async fn test_insert_failure_after_upload_is_partial() {
        let backend = MemoryBackend::new();
        backend.fail_next(Operation::InsertCommunity, ApiError::Http { status: 500, message: "boom".into() });
        let mut form = draft("Rustaceans");
        form.logo = Some(png("logo.png"));

        let err = create_community(&backend, &StorageConfig::default(), Some(&user("u1")), &form)
            .await
            .unwrap_err();

        match err {
            FormError::PartialFailure { object_path, source } => {
                assert!(object_path.starts_with("logo-"));
                assert_eq!(source, ApiError::Http { status: 500, message: "boom".into() });
            }
            other => panic!("expected partial failure, got {other:?}"),
        }
        assert!(backend.communities().is_empty());
    }

    #[tokio::test]
    async fn test_insert_failure_without_upload_is_plain() {
        let backend = MemoryBackend::new();
        backend.fail_next(Operation::InsertCommunity, ApiError::Network("reset".into()));

        let err = create_community(&backend, &StorageConfig::default(), Some(&user("u1")), &draft("Rustaceans"))
            .await
            .unwrap_err();

        assert_eq!(err, FormError::Api(ApiError::Network("reset".into())));
    }

    #[tokio::test]
    async fn test_profile_update_failure_after_avatar_upload() {
        let backend = MemoryBackend::new();
        let account = backend.add_account("amal@example.com", "secret1", "Amal");
        backend.fail_next(Operation::UpdateProfile, ApiError::Http { status: 403, message: "denied".into() });
        let form = ProfileDraft {
            full_name: "Amal H".to_string(),
            username: "amal".to_string(),
            avatar: Some(png("me.png")),
        };

        let err = save_profile(&backend, &StorageConfig::default(), &account.id, &form)
            .await
            .unwrap_err();

        let expected_path = format!("avatars/{}.png", account.id);
        assert_eq!(
            err,
            FormError::PartialFailure {
                object_path: expected_path.clone(),
                source: ApiError::Http { status: 403, message: "denied".into() },
            }
        );
        assert!(backend.object("avatars", &expected_path).is_some());
        let profile = backend.profile(&account.id).unwrap();
        assert_eq!(profile.full_name.as_deref(), Some("Amal"));
        assert!(profile.avatar_url.is_none());
    }

    #[tokio::test]
    async fn test_profile_save_without_avatar_keeps_url() {
        let backend = MemoryBackend::new();
        let account = backend.add_account("amal@example.com", "secret1", "Amal");
        let form = ProfileDraft {
            full_name: " Amal Haddad ".to_string(),
            username: "amal".to_string(),
            avatar: None,
        };

        let update = save_profile(&backend, &StorageConfig::default(), &account.id, &form)
            .await
            .unwrap();

        assert!(update.avatar_url.is_none());
        let profile = backend.profile(&account.id).unwrap();
        assert_eq!(profile.full_name.as_deref(), Some("Amal Haddad"));
        assert!(profile.updated_at.is_some());
        assert_eq!(backend.calls(Operation::Upload), 0);
    }

    fn sign_up_draft() -> SignUpDraft {
        SignUpDraft {
            full_name: "Amal Haddad".to_string(),
            username: "amal".to_string(),
            email: " Amal@Example.com ".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            avatar: None,
        }
    }

    #[tokio::test]
    async fn test_sign_up_mismatch_makes_no_calls() {
        let backend = MemoryBackend::new();
        let mut form = sign_up_draft();
        form.confirm_password = "secret2".to_string();

        let err = sign_up(&backend, &StorageConfig::default(), &form).await.unwrap_err();

        assert_eq!(err, FormError::Validation(ValidationError::PasswordMismatch));
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_sign_up_with_avatar() {
        let backend = MemoryBackend::new();
        let mut form = sign_up_draft();
        form.avatar = Some(png("me.png"));

        let outcome = sign_up(&backend, &StorageConfig::default(), &form).await.unwrap();

        assert!(outcome.avatar_error.is_none());
        assert_eq!(outcome.user.email.as_deref(), Some("amal@example.com"));
        let profile = backend.profile(&outcome.user.id).unwrap();
        assert_eq!(
            profile.avatar_url,
            Some(format!("memory://storage/avatars/avatars/{}.png", outcome.user.id))
        );
    }

    #[tokio::test]
    async fn test_sign_up_avatar_failure_keeps_account() {
        let backend = MemoryBackend::new();
        backend.fail_next(Operation::Upload, ApiError::Network("reset".into()));
        let mut form = sign_up_draft();
        form.avatar = Some(png("me.png"));

        let outcome = sign_up(&backend, &StorageConfig::default(), &form).await.unwrap();

        assert_eq!(outcome.avatar_error, Some(FormError::Api(ApiError::Network("reset".into()))));
        assert!(backend.profile(&outcome.user.id).is_some());
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_email_surfaces_message() {
        let backend = MemoryBackend::new();
        backend.add_account("amal@example.com", "other1", "Amal");

        let err = sign_up(&backend, &StorageConfig::default(), &sign_up_draft()).await.unwrap_err();

        assert_eq!(err.to_string(), "User already registered");
    }

    #[tokio::test]
    async fn test_join_is_idempotent() {
        let backend = MemoryBackend::new();
        let community = create_community(&backend, &StorageConfig::default(), Some(&user("owner")), &draft("Club"))
            .await
            .unwrap();
        let member = user("u2");

        let first = join_community(&backend, Some(&member), &community).await.unwrap();
        let second = join_community(&backend, Some(&member), &community).await.unwrap();

        let JoinOutcome::Joined(row) = first else {
            panic!("first join should insert");
        };
        assert_eq!(row.role, MembershipRole::Member);
        assert_eq!(second, JoinOutcome::AlreadyMember(row));
        assert_eq!(backend.calls(Operation::InsertMembership), 1);
    }

    #[tokio::test]
    async fn test_join_full_community_is_refused() {
        let backend = MemoryBackend::new();
        let mut form = draft("Tiny");
        form.max_members = "1".to_string();
        let community = create_community(&backend, &StorageConfig::default(), Some(&user("owner")), &form)
            .await
            .unwrap();
        backend.add_member(&community.id, "first");

        let err = join_community(&backend, Some(&user("late")), &community).await.unwrap_err();

        assert_eq!(err, FormError::CommunityFull);
        assert_eq!(backend.calls(Operation::InsertMembership), 0);
    }

    #[tokio::test]
    async fn test_creator_joins_with_creator_role() {
        let backend = MemoryBackend::new();
        let owner = user("owner");
        let community = create_community(&backend, &StorageConfig::default(), Some(&owner), &draft("Club"))
            .await
            .unwrap();

        let outcome = join_community(&backend, Some(&owner), &community).await.unwrap();

        assert!(matches!(outcome, JoinOutcome::Joined(m) if m.role == MembershipRole::Creator));
    }
}
