//! `/rest/v1`: profile, community and membership rows.

use reqwest::Method;
use serde::de::DeserializeOwned;
use store::{Community, Membership, NewCommunity, NewMembership, Profile, ProfileUpdate};

use super::{check, RestBackend};
use crate::error::ApiError;

const PROFILES: &str = "/rest/v1/profiles";
const COMMUNITIES: &str = "/rest/v1/communities";
const MEMBERS: &str = "/rest/v1/community_members";

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

/// Total from a `Content-Range` header such as `0-0/42` or `*/42`.
fn parse_content_range(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

impl RestBackend {
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, ApiError> {
        let response = self
            .request(Method::GET, table)
            .query(&[("select", "*")])
            .query(filters)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Insert one row and read it back.
    async fn insert<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;
        let mut rows: Vec<T> = check(response).await?.json().await?;
        if rows.is_empty() {
            return Err(ApiError::Decode("insert returned no row".to_string()));
        }
        Ok(rows.swap_remove(0))
    }

    pub(super) async fn select_profile(&self, user_id: &str) -> Result<Profile, ApiError> {
        let rows: Vec<Profile> = self.select(PROFILES, &[("id", eq(user_id))]).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound("Profile".to_string()))
    }

    pub(super) async fn patch_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<(), ApiError> {
        let response = self
            .request(Method::PATCH, PROFILES)
            .query(&[("id", eq(user_id))])
            .header("Prefer", "return=minimal")
            .json(update)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    pub(super) async fn select_communities(&self) -> Result<Vec<Community>, ApiError> {
        self.select(COMMUNITIES, &[("order", "created_at.desc".to_string())])
            .await
    }

    pub(super) async fn select_community(&self, id: &str) -> Result<Option<Community>, ApiError> {
        let rows: Vec<Community> = self.select(COMMUNITIES, &[("id", eq(id))]).await?;
        Ok(rows.into_iter().next())
    }

    pub(super) async fn post_community(&self, community: &NewCommunity) -> Result<Community, ApiError> {
        self.insert(COMMUNITIES, community).await
    }

    pub(super) async fn count_membership_rows(&self, community_id: &str) -> Result<u64, ApiError> {
        let response = self
            .request(Method::HEAD, MEMBERS)
            .query(&[("select", "id".to_string()), ("community_id", eq(community_id))])
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let response = check(response).await?;
        let range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Decode("missing Content-Range header".to_string()))?;
        parse_content_range(range)
            .ok_or_else(|| ApiError::Decode(format!("unreadable Content-Range: {range}")))
    }

    pub(super) async fn select_membership(
        &self,
        community_id: &str,
        user_id: &str,
    ) -> Result<Option<Membership>, ApiError> {
        let rows: Vec<Membership> = self
            .select(
                MEMBERS,
                &[
                    ("community_id", eq(community_id)),
                    ("user_id", eq(user_id)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    pub(super) async fn post_membership(
        &self,
        membership: &NewMembership,
    ) -> Result<Membership, ApiError> {
        self.insert(MEMBERS, membership).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_range_forms() {
        assert_eq!(parse_content_range("0-0/42"), Some(42));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-24/ 7"), Some(7));
        assert_eq!(parse_content_range("0-24/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }

    #[test]
    fn test_eq_filter() {
        assert_eq!(eq("c1"), "eq.c1");
    }
}
