//! Ingestion of crawl results into the graph store
//!
//! Three passes run in order: users (profile enrichment plus each user's own
//! subscriptions), groups collected during the crawl, then FOLLOW edges. Every
//! failure is isolated to the entity it happened on and counted in
//! [`IngestStats`]; nothing here aborts a run.

mod normalize;

pub use normalize::{title_case, user_node};

use crate::crawler::{CrawlResult, FollowEdge};
use crate::neo4j::{GraphStore, GroupNode};
use crate::vk::{GroupProfile, Identity, SocialGraphClient};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashSet;
use std::ops::AddAssign;
use std::sync::Arc;

/// Counters for one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub users_written: usize,
    pub users_failed: usize,
    pub groups_written: usize,
    pub groups_failed: usize,
    pub subscribe_edges_linked: usize,
    pub subscribe_edges_dropped: usize,
    pub subscribe_edges_failed: usize,
    pub follow_edges_linked: usize,
    pub follow_edges_dropped: usize,
    pub follow_edges_failed: usize,
    /// Subscription lookups that failed during the user pass
    pub fetch_failures: usize,
}

impl AddAssign for IngestStats {
    fn add_assign(&mut self, other: Self) {
        self.users_written += other.users_written;
        self.users_failed += other.users_failed;
        self.groups_written += other.groups_written;
        self.groups_failed += other.groups_failed;
        self.subscribe_edges_linked += other.subscribe_edges_linked;
        self.subscribe_edges_dropped += other.subscribe_edges_dropped;
        self.subscribe_edges_failed += other.subscribe_edges_failed;
        self.follow_edges_linked += other.follow_edges_linked;
        self.follow_edges_dropped += other.follow_edges_dropped;
        self.follow_edges_failed += other.follow_edges_failed;
        self.fetch_failures += other.fetch_failures;
    }
}

/// Writes crawl output to a [`GraphStore`], enriching users via the API
pub struct IngestionPipeline {
    client: Arc<dyn SocialGraphClient>,
    store: Arc<dyn GraphStore>,
    concurrency: usize,
    include_seed: bool,
}

impl IngestionPipeline {
    /// Create a new pipeline
    pub fn new(client: Arc<dyn SocialGraphClient>, store: Arc<dyn GraphStore>) -> Self {
        Self {
            client,
            store,
            concurrency: 1,
            include_seed: false,
        }
    }

    /// Maximum entities written at the same time
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Also ingest the crawl seed as a user, with its own SUBSCRIBE edges
    pub fn with_seed(mut self, include_seed: bool) -> Self {
        self.include_seed = include_seed;
        self
    }

    /// Run all passes over a crawl result
    pub async fn run(&self, crawl: &CrawlResult) -> IngestStats {
        let mut stats = IngestStats::default();

        let seed = crawl.seed.filter(|_| self.include_seed);
        let users: Vec<Identity> = seed
            .into_iter()
            .chain(crawl.followers.iter().copied())
            .collect();

        stats += self.user_pass(&users).await;
        stats += self.group_pass(&crawl.subscriptions).await;
        stats += self.follow_pass(&crawl.follow_edges).await;

        tracing::info!(
            users_written = stats.users_written,
            users_failed = stats.users_failed,
            groups_written = stats.groups_written,
            groups_failed = stats.groups_failed,
            follow_edges = stats.follow_edges_linked,
            subscribe_edges = stats.subscribe_edges_linked,
            "Ingestion complete"
        );

        stats
    }

    // ========================================================================
    // User pass
    // ========================================================================

    /// Ingest every follower identity. Duplicates are processed again; writes
    /// are idempotent so the stored state is the same.
    pub async fn user_pass(&self, users: &[Identity]) -> IngestStats {
        stream::iter(users.iter().copied())
            .map(|id| self.ingest_user(id))
            .buffer_unordered(self.concurrency)
            .fold(IngestStats::default(), |mut acc, stats| async move {
                acc += stats;
                acc
            })
            .await
    }

    async fn ingest_user(&self, id: Identity) -> IngestStats {
        let mut stats = IngestStats::default();

        let profile = match self.client.get_profile(id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::error!(user_id = %id, error = %e, "Failed to fetch profile, skipping user");
                stats.users_failed += 1;
                return stats;
            }
        };

        let node = user_node(&profile);
        if let Err(e) = self.store.upsert_user(&node).await {
            tracing::error!(user_id = %id, error = %e, "Failed to save user, skipping");
            stats.users_failed += 1;
            return stats;
        }
        stats.users_written += 1;
        tracing::info!(user_id = %id, "User saved to Neo4j");

        let subscriptions = match self.client.get_subscriptions(id).await {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                tracing::warn!(user_id = %id, error = %e, "Failed to fetch subscriptions");
                stats.fetch_failures += 1;
                Vec::new()
            }
        };

        for group in &subscriptions {
            if !self.write_group(group, &mut stats).await {
                continue;
            }

            match self.store.upsert_subscribe_edge(profile.id, group.id).await {
                Ok(true) => {
                    stats.subscribe_edges_linked += 1;
                    tracing::debug!(user_id = %id, group_id = %group.id, "Subscription saved");
                }
                Ok(false) => {
                    stats.subscribe_edges_dropped += 1;
                    tracing::warn!(user_id = %id, group_id = %group.id, "Subscription dropped");
                }
                Err(e) => {
                    stats.subscribe_edges_failed += 1;
                    tracing::error!(
                        user_id = %id,
                        group_id = %group.id,
                        error = %e,
                        "Failed to save subscription"
                    );
                }
            }
        }

        stats
    }

    // ========================================================================
    // Group pass
    // ========================================================================

    /// Upsert groups collected during the crawl, from the records themselves.
    /// No SUBSCRIBE edges are created here.
    pub async fn group_pass(&self, groups: &[GroupProfile]) -> IngestStats {
        stream::iter(groups)
            .map(|group| async move {
                let mut stats = IngestStats::default();
                self.write_group(group, &mut stats).await;
                stats
            })
            .buffer_unordered(self.concurrency)
            .fold(IngestStats::default(), |mut acc, stats| async move {
                acc += stats;
                acc
            })
            .await
    }

    /// Upsert one group node, recording the outcome. Returns whether it was written.
    async fn write_group(&self, group: &GroupProfile, stats: &mut IngestStats) -> bool {
        match self.store.upsert_group(&GroupNode::from(group)).await {
            Ok(()) => {
                stats.groups_written += 1;
                tracing::debug!(group_id = %group.id, "Group saved to Neo4j");
                true
            }
            Err(e) => {
                stats.groups_failed += 1;
                tracing::error!(group_id = %group.id, error = %e, "Failed to save group");
                false
            }
        }
    }

    // ========================================================================
    // Follow pass
    // ========================================================================

    /// Upsert discovered FOLLOW edges. Edges whose endpoints were never
    /// ingested are dropped by the store and counted as such.
    pub async fn follow_pass(&self, edges: &[FollowEdge]) -> IngestStats {
        let mut seen = HashSet::new();
        let unique: Vec<FollowEdge> = edges.iter().copied().filter(|e| seen.insert(*e)).collect();

        stream::iter(unique)
            .map(|edge| async move {
                let mut stats = IngestStats::default();
                match self
                    .store
                    .upsert_follow_edge(edge.follower, edge.followee)
                    .await
                {
                    Ok(true) => stats.follow_edges_linked += 1,
                    Ok(false) => {
                        stats.follow_edges_dropped += 1;
                        tracing::debug!(
                            follower = %edge.follower,
                            followee = %edge.followee,
                            "Follow edge dropped, endpoint not ingested"
                        );
                    }
                    Err(e) => {
                        stats.follow_edges_failed += 1;
                        tracing::error!(
                            follower = %edge.follower,
                            followee = %edge.followee,
                            error = %e,
                            "Failed to save follow edge"
                        );
                    }
                }
                stats
            })
            .buffer_unordered(self.concurrency)
            .fold(IngestStats::default(), |mut acc, stats| async move {
                acc += stats;
                acc
            })
            .await
    }
}
