//! Trait abstraction for graph storage operations

use super::models::*;
use crate::vk::models::Identity;
use anyhow::Result;
use async_trait::async_trait;

/// Trait abstracting every graph operation used by ingestion and analytics.
///
/// Node upserts merge by identity (last write wins). Edge upserts merge by
/// endpoint pair and return `false` without writing when an endpoint node is
/// missing or both endpoints are the same identity.
#[async_trait]
pub trait GraphStore: Send + Sync {
    // ========================================================================
    // Writes
    // ========================================================================

    /// Create or overwrite a user node
    async fn upsert_user(&self, user: &UserNode) -> Result<()>;

    /// Create or overwrite a group node
    async fn upsert_group(&self, group: &GroupNode) -> Result<()>;

    /// Ensure `follower -[:FOLLOW]-> followee` exists
    async fn upsert_follow_edge(&self, follower: Identity, followee: Identity) -> Result<bool>;

    /// Ensure `subscriber -[:SUBSCRIBE]-> group` exists
    async fn upsert_subscribe_edge(&self, subscriber: Identity, group: Identity)
        -> Result<bool>;

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Get a user node by identity
    async fn get_user(&self, id: Identity) -> Result<Option<UserNode>>;

    /// Get a group node by identity
    async fn get_group(&self, id: Identity) -> Result<Option<GroupNode>>;

    // ========================================================================
    // Aggregates
    // ========================================================================

    /// Number of user nodes
    async fn count_users(&self) -> Result<i64>;

    /// Number of group nodes
    async fn count_groups(&self) -> Result<i64>;

    /// Number of relationships of one kind
    async fn count_edges(&self, kind: EdgeKind) -> Result<i64>;

    /// Users by descending FOLLOW in-degree, ties by identity ascending
    async fn top_users_by_followers(&self, limit: usize) -> Result<Vec<RankedEntry>>;

    /// Groups by descending SUBSCRIBE in-degree, ties by identity ascending
    async fn top_groups_by_subscribers(&self, limit: usize) -> Result<Vec<RankedEntry>>;

    /// Every reciprocal FOLLOW pair, once, sorted
    async fn mutual_followers(&self) -> Result<Vec<MutualPair>>;
}
