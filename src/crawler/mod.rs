//! Depth-bounded follower crawler
//!
//! Expands the follower graph level by level starting from a seed. Each level's
//! frontier is fetched with bounded concurrency and merged back in frontier
//! order, so the collected sequences are deterministic for a given API state.
//! The crawler only reads from the social network; it never touches storage.

mod visited;

pub use visited::VisitedSet;

use crate::vk::{GroupProfile, Identity, SocialGraphClient};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;

/// Default number of followers requested per identity
pub const DEFAULT_FOLLOWERS_LIMIT: u32 = 100;

/// `follower -> followee`, as observed while expanding `followee`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FollowEdge {
    pub follower: Identity,
    pub followee: Identity,
}

/// Everything discovered by one crawl invocation
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlResult {
    /// Seed the crawl started from; `None` when nothing was expanded
    pub seed: Option<Identity>,
    /// Followers in discovery order; the same identity may appear once per source
    pub followers: Vec<Identity>,
    /// Subscriptions of every expanded identity, in discovery order
    pub subscriptions: Vec<GroupProfile>,
    pub follow_edges: Vec<FollowEdge>,
    /// Number of identities expanded
    pub expanded: usize,
    /// Number of follower/subscription fetches that failed
    pub fetch_failures: usize,
}

/// Result of expanding a single identity
struct Expansion {
    id: Identity,
    followers: Vec<Identity>,
    subscriptions: Vec<GroupProfile>,
    failures: usize,
}

/// Crawler over a [`SocialGraphClient`]
pub struct Crawler {
    client: Arc<dyn SocialGraphClient>,
    followers_limit: u32,
    concurrency: usize,
}

impl Crawler {
    /// Create a new crawler
    pub fn new(client: Arc<dyn SocialGraphClient>) -> Self {
        Self {
            client,
            followers_limit: DEFAULT_FOLLOWERS_LIMIT,
            concurrency: 1,
        }
    }

    /// Maximum followers fetched per identity
    pub fn with_followers_limit(mut self, limit: u32) -> Self {
        self.followers_limit = limit;
        self
    }

    /// Maximum identities expanded at the same time within one level
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Crawl from `seed` with a fresh visited set
    pub async fn crawl(&self, seed: Identity, max_depth: u32) -> CrawlResult {
        let visited = VisitedSet::new();
        self.crawl_with(seed, max_depth, &visited).await
    }

    /// Crawl from `seed`, recording expansions in a caller-owned visited set.
    ///
    /// `max_depth` counts expansion steps: 0 fetches nothing, 1 expands the seed
    /// only, 2 also expands the seed's followers, and so on. An identity already
    /// in `visited` is never expanded again, so cycles terminate and a node
    /// reachable along several paths is expanded once, at its shallowest depth.
    pub async fn crawl_with(
        &self,
        seed: Identity,
        max_depth: u32,
        visited: &VisitedSet,
    ) -> CrawlResult {
        let mut result = CrawlResult::default();
        if max_depth < 1 {
            return result;
        }
        result.seed = Some(seed);

        tracing::info!(seed = %seed, max_depth, "Starting crawl");

        let mut frontier = vec![seed];
        let mut remaining = max_depth;

        while remaining >= 1 && !frontier.is_empty() {
            let to_expand: Vec<Identity> = frontier
                .into_iter()
                .filter(|id| {
                    let fresh = visited.mark(*id);
                    if !fresh {
                        tracing::warn!(user_id = %id, "User already visited, skipping");
                    }
                    fresh
                })
                .collect();

            let expansions: Vec<Expansion> = stream::iter(to_expand)
                .map(|id| self.expand(id))
                .buffered(self.concurrency)
                .collect()
                .await;

            let mut next = Vec::new();
            for expansion in expansions {
                result.expanded += 1;
                result.fetch_failures += expansion.failures;
                result
                    .follow_edges
                    .extend(expansion.followers.iter().map(|follower| FollowEdge {
                        follower: *follower,
                        followee: expansion.id,
                    }));
                if remaining > 1 {
                    next.extend(expansion.followers.iter().copied());
                }
                result.followers.extend(expansion.followers);
                result.subscriptions.extend(expansion.subscriptions);
            }

            frontier = next;
            remaining -= 1;
        }

        tracing::info!(
            seed = %seed,
            expanded = result.expanded,
            followers = result.followers.len(),
            subscriptions = result.subscriptions.len(),
            failures = result.fetch_failures,
            "Crawl complete"
        );

        result
    }

    /// Fetch followers and subscriptions of one identity.
    ///
    /// The two calls are independent: a failure of either is logged and counted
    /// as zero results without affecting the other.
    async fn expand(&self, id: Identity) -> Expansion {
        let (followers, subscriptions) = tokio::join!(
            self.client.get_followers(id, self.followers_limit),
            self.client.get_subscriptions(id)
        );

        let mut failures = 0;

        let followers = match followers {
            Ok(followers) => {
                tracing::info!(user_id = %id, count = followers.len(), "Found followers");
                followers
            }
            Err(e) => {
                tracing::error!(user_id = %id, error = %e, "Failed to fetch followers");
                failures += 1;
                Vec::new()
            }
        };

        let subscriptions = match subscriptions {
            Ok(subscriptions) => {
                tracing::info!(
                    user_id = %id,
                    count = subscriptions.len(),
                    "Found subscriptions"
                );
                subscriptions
            }
            Err(e) => {
                tracing::error!(user_id = %id, error = %e, "Failed to fetch subscriptions");
                failures += 1;
                Vec::new()
            }
        };

        Expansion {
            id,
            followers,
            subscriptions,
            failures,
        }
    }
}
