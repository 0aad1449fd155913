//! Image uploads and bucket bootstrap.

use chrono::Utc;
use store::ImageFile;

use crate::backend::Backend;
use crate::error::ApiError;

/// Which community image slot a file fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageSlot {
    Logo,
    Banner,
}

impl ImageSlot {
    fn prefix(self) -> &'static str {
        match self {
            ImageSlot::Logo => "logo",
            ImageSlot::Banner => "banner",
        }
    }
}

/// `<slot>-<millis>.<ext>`, unique per submit.
pub fn community_image_path(slot: ImageSlot, file: &ImageFile, millis: i64) -> String {
    format!("{}-{millis}.{}", slot.prefix(), file.extension())
}

/// `avatars/<user id>.<ext>`; re-uploads overwrite the previous avatar.
pub fn avatar_path(user_id: &str, file: &ImageFile) -> String {
    format!("avatars/{user_id}.{}", file.extension())
}

/// Store `file` and return its public URL.
pub async fn upload_image<B: Backend>(
    backend: &B,
    bucket: &str,
    path: &str,
    file: &ImageFile,
    upsert: bool,
) -> Result<String, ApiError> {
    backend
        .upload(bucket, path, &file.bytes, &file.mime(), upsert)
        .await?;
    Ok(backend.public_url(bucket, path))
}

/// Create a public `bucket` unless it already exists. Returns whether it
/// was created.
pub async fn ensure_bucket<B: Backend>(backend: &B, bucket: &str) -> Result<bool, ApiError> {
    if backend.bucket_exists(bucket).await? {
        tracing::debug!("Storage bucket {bucket} present");
        return Ok(false);
    }
    tracing::info!("Storage bucket {bucket} missing, creating it");
    backend.create_bucket(bucket, true).await?;
    Ok(true)
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryBackend, Operation};

    fn png() -> ImageFile {
        ImageFile::new("photo.PNG", Some("image/png".to_string()), vec![0x89, b'P', b'N', b'G'])
    }

    #[test]
    fn test_paths() {
        assert_eq!(community_image_path(ImageSlot::Logo, &png(), 1_700_000_000_000), "logo-1700000000000.png");
        assert_eq!(community_image_path(ImageSlot::Banner, &png(), 5), "banner-5.png");
        assert_eq!(avatar_path("u1", &png()), "avatars/u1.png");
    }

    #[tokio::test]
    async fn test_upload_returns_public_url() {
        let backend = MemoryBackend::new();
        let url = upload_image(&backend, "avatars", "avatars/u1.png", &png(), true).await.unwrap();
        assert_eq!(url, "memory://storage/avatars/avatars/u1.png");
        let stored = backend.object("avatars", "avatars/u1.png").unwrap();
        assert_eq!(stored.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_ensure_bucket_creates_once() {
        let backend = MemoryBackend::new();
        backend.remove_bucket("avatars");

        assert!(ensure_bucket(&backend, "avatars").await.unwrap());
        assert!(!ensure_bucket(&backend, "avatars").await.unwrap());
        assert_eq!(backend.calls(Operation::CreateBucket), 1);
    }
}
