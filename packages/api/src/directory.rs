//! Loading the community directory: the community list plus one member
//! count per community, joined into display [`Listing`]s.

use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use store::{AuthUser, Community, Listing, Membership, RequestGeneration, Ticket};

use crate::backend::Backend;
use crate::error::ApiError;
use crate::retry::{with_retry, RetryPolicy};

/// Fetch every community and its member count.
///
/// Counts run with at most `concurrency` requests in flight and are keyed by
/// community id, so completion order never matters. Any failed read fails
/// the whole fetch; nothing partial is returned.
pub async fn fetch_listings<B: Backend>(
    backend: &B,
    retry: RetryPolicy,
    concurrency: usize,
) -> Result<Vec<Listing>, ApiError> {
    let communities = with_retry(retry, "community list", || backend.list_communities()).await?;
    let counts = member_counts(backend, &communities, retry, concurrency).await?;
    tracing::debug!("Loaded {} communities", communities.len());
    Ok(communities
        .iter()
        .map(|c| Listing::from_community(c, counts.get(&c.id).copied().unwrap_or(0)))
        .collect())
}

async fn member_counts<B: Backend>(
    backend: &B,
    communities: &[Community],
    retry: RetryPolicy,
    concurrency: usize,
) -> Result<HashMap<String, u64>, ApiError> {
    let mut counts = HashMap::with_capacity(communities.len());
    let mut pending = stream::iter(communities.iter().map(|community| async move {
        let id = community.id.as_str();
        let count = with_retry(retry, "member count", || backend.count_members(id)).await?;
        Ok::<_, ApiError>((id, count))
    }))
    .buffer_unordered(concurrency.max(1));

    while let Some(result) = pending.next().await {
        let (id, count) = result?;
        counts.insert(id.to_string(), count);
    }
    Ok(counts)
}

/// Directory fetcher that only hands out results of the latest request.
#[derive(Clone)]
pub struct DirectoryLoader<B> {
    backend: B,
    retry: RetryPolicy,
    concurrency: usize,
    generation: RequestGeneration,
}

impl<B: Backend> DirectoryLoader<B> {
    pub fn new(backend: B, retry: RetryPolicy, concurrency: usize) -> Self {
        Self {
            backend,
            retry,
            concurrency,
            generation: RequestGeneration::new(),
        }
    }

    /// Fetch the directory. `None` when a newer load started (or the loader
    /// was invalidated) while this one was in flight.
    pub async fn load(&self) -> Option<Result<Vec<Listing>, ApiError>> {
        let ticket = self.generation.begin();
        let result = fetch_listings(&self.backend, self.retry, self.concurrency).await;
        self.publishable(ticket, result)
    }

    /// Drop whatever is in flight, e.g. when the view unmounts.
    pub fn invalidate(&self) {
        self.generation.invalidate();
    }

    fn publishable<T>(&self, ticket: Ticket, result: T) -> Option<T> {
        if self.generation.is_current(ticket) {
            Some(result)
        } else {
            tracing::debug!("Dropping superseded directory response");
            None
        }
    }
}

/// Everything the community page shows.
#[derive(Clone, Debug, PartialEq)]
pub struct CommunityDetail {
    pub community: Community,
    pub members: u64,
    /// The viewer's membership row, if any.
    pub membership: Option<Membership>,
}

impl CommunityDetail {
    pub fn is_full(&self) -> bool {
        self.community
            .max_members
            .is_some_and(|max| self.members >= u64::from(max))
    }

    pub fn is_creator(&self, user_id: Option<&str>) -> bool {
        user_id == Some(self.community.creator_id.as_str())
    }
}

/// Load one community with its member count and the viewer's membership.
pub async fn fetch_community_detail<B: Backend>(
    backend: &B,
    retry: RetryPolicy,
    id: &str,
    viewer: Option<&AuthUser>,
) -> Result<Option<CommunityDetail>, ApiError> {
    let Some(community) = with_retry(retry, "community", || backend.fetch_community(id)).await?
    else {
        return Ok(None);
    };
    let members = with_retry(retry, "member count", || backend.count_members(id)).await?;
    let membership = match viewer {
        Some(user) => {
            with_retry(retry, "membership", || backend.find_membership(id, &user.id)).await?
        }
        None => None,
    };
    Ok(Some(CommunityDetail {
        community,
        members,
        membership,
    }))
}

#[cfg(test)]
mod tests {
    use store::NewCommunity;

    use super::*;
    use crate::memory::{MemoryBackend, Operation};

    fn new_community(name: &str, max_members: Option<u32>) -> NewCommunity {
        NewCommunity {
            creator_id: "creator".to_string(),
            name: name.to_string(),
            description: None,
            category: Some("tech".to_string()),
            language: Some("english".to_string()),
            banner_url: None,
            logo_url: None,
            membership_fee: None,
            max_members,
            rules: None,
            video_embed: None,
        }
    }

    #[tokio::test]
    async fn test_listings_join_counts_by_id() {
        let backend = MemoryBackend::new();
        let busy = backend.add_community(new_community("Busy", None));
        let quiet = backend.add_community(new_community("Quiet", None));
        for user in ["a", "b", "c"] {
            backend.add_member(&busy.id, user);
        }

        let listings = fetch_listings(&backend, RetryPolicy::none(), 2).await.unwrap();

        assert_eq!(listings.len(), 2);
        let by_id: HashMap<_, _> = listings.iter().map(|l| (l.id.clone(), l.members)).collect();
        assert_eq!(by_id[&busy.id], 3);
        assert_eq!(by_id[&quiet.id], 0);
        assert_eq!(backend.calls(Operation::CountMembers), 2);
    }

    #[tokio::test]
    async fn test_zero_member_community_is_listed() {
        let backend = MemoryBackend::new();
        backend.add_community(new_community("Fresh", Some(10)));

        let listings = fetch_listings(&backend, RetryPolicy::none(), 4).await.unwrap();

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].members, 0);
        assert_eq!(listings[0].language, "ENGLISH");
        assert!(!listings[0].is_full());
    }

    #[tokio::test]
    async fn test_empty_directory_makes_no_count_calls() {
        let backend = MemoryBackend::new();
        let listings = fetch_listings(&backend, RetryPolicy::none(), 4).await.unwrap();
        assert!(listings.is_empty());
        assert_eq!(backend.calls(Operation::CountMembers), 0);
    }

    #[tokio::test]
    async fn test_count_failure_fails_the_fetch() {
        let backend = MemoryBackend::new();
        backend.add_community(new_community("One", None));
        backend.add_community(new_community("Two", None));
        backend.fail_next(Operation::CountMembers, ApiError::Http { status: 403, message: "denied".into() });

        let result = fetch_listings(&backend, RetryPolicy::immediate(3), 1).await;

        assert_eq!(result, Err(ApiError::Http { status: 403, message: "denied".into() }));
    }

    #[tokio::test]
    async fn test_transient_list_failure_is_retried() {
        let backend = MemoryBackend::new();
        backend.add_community(new_community("One", None));
        backend.fail_next(Operation::ListCommunities, ApiError::Network("reset".into()));

        let listings = fetch_listings(&backend, RetryPolicy::immediate(2), 4).await.unwrap();

        assert_eq!(listings.len(), 1);
        assert_eq!(backend.calls(Operation::ListCommunities), 2);
    }

    #[tokio::test]
    async fn test_superseded_load_is_dropped() {
        let backend = MemoryBackend::new();
        backend.add_community(new_community("One", None));
        let loader = DirectoryLoader::new(backend.clone(), RetryPolicy::none(), 4);
        let gate = backend.hold(Operation::ListCommunities);

        let newer = async {
            loader.invalidate();
            gate.notify_one();
        };
        let (stale, ()) = tokio::join!(loader.load(), newer);
        assert!(stale.is_none());

        backend.release(Operation::ListCommunities);
        let fresh = loader.load().await.unwrap().unwrap();
        assert_eq!(fresh.len(), 1);
    }

    #[tokio::test]
    async fn test_detail_includes_viewer_membership() {
        let backend = MemoryBackend::new();
        let community = backend.add_community(new_community("Club", Some(2)));
        let viewer = backend.add_account("amal@example.com", "secret1", "Amal");
        backend.add_member(&community.id, &viewer.id);
        backend.add_member(&community.id, "someone-else");

        let detail = fetch_community_detail(&backend, RetryPolicy::none(), &community.id, Some(&viewer))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(detail.members, 2);
        assert!(detail.is_full());
        assert!(detail.membership.is_some());
        assert!(detail.is_creator(Some("creator")));
        assert!(!detail.is_creator(None));
    }

    #[tokio::test]
    async fn test_detail_for_unknown_id() {
        let backend = MemoryBackend::new();
        let detail = fetch_community_detail(&backend, RetryPolicy::none(), "missing", None)
            .await
            .unwrap();
        assert!(detail.is_none());
        assert_eq!(backend.calls(Operation::CountMembers), 0);
    }
}
