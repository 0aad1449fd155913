//! `/storage/v1`: object upload and bucket management.

use reqwest::Method;
use serde_json::json;

use super::{check, RestBackend};
use crate::error::ApiError;

impl RestBackend {
    pub(super) async fn put_object(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        upsert: bool,
    ) -> Result<(), ApiError> {
        let response = self
            .request(Method::POST, &format!("/storage/v1/object/{bucket}/{path}"))
            .header("Content-Type", content_type)
            .header("x-upsert", if upsert { "true" } else { "false" })
            .body(bytes.to_vec())
            .send()
            .await?;
        check(response).await?;
        tracing::debug!("Uploaded {bucket}/{path} ({} bytes)", bytes.len());
        Ok(())
    }

    pub(super) fn object_public_url(&self, bucket: &str, path: &str) -> String {
        self.endpoint(&format!("/storage/v1/object/public/{bucket}/{path}"))
    }

    /// Missing buckets answer 404, or 400 on older storage versions.
    pub(super) async fn get_bucket(&self, bucket: &str) -> Result<bool, ApiError> {
        let response = self
            .request(Method::GET, &format!("/storage/v1/bucket/{bucket}"))
            .send()
            .await?;
        match check(response).await {
            Ok(_) => Ok(true),
            Err(ApiError::Http { status: 400 | 404, .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub(super) async fn post_bucket(&self, bucket: &str, public: bool) -> Result<(), ApiError> {
        let response = self
            .request(Method::POST, "/storage/v1/bucket")
            .json(&json!({ "id": bucket, "name": bucket, "public": public }))
            .send()
            .await?;
        check(response).await?;
        tracing::info!("Created storage bucket {bucket}");
        Ok(())
    }
}
