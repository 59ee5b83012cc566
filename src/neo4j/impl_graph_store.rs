//! `GraphStore` implementation for `Neo4jClient`.
//!
//! Every method simply delegates to the corresponding inherent method on `Neo4jClient`.

use async_trait::async_trait;

use super::client::Neo4jClient;
use super::models::*;
use super::traits::GraphStore;
use crate::vk::models::Identity;

#[async_trait]
impl GraphStore for Neo4jClient {
    async fn upsert_user(&self, user: &UserNode) -> anyhow::Result<()> {
        self.upsert_user(user).await
    }

    async fn upsert_group(&self, group: &GroupNode) -> anyhow::Result<()> {
        self.upsert_group(group).await
    }

    async fn upsert_follow_edge(
        &self,
        follower: Identity,
        followee: Identity,
    ) -> anyhow::Result<bool> {
        self.upsert_edge(EdgeKind::Follow, follower, followee).await
    }

    async fn upsert_subscribe_edge(
        &self,
        subscriber: Identity,
        group: Identity,
    ) -> anyhow::Result<bool> {
        self.upsert_edge(EdgeKind::Subscribe, subscriber, group).await
    }

    async fn get_user(&self, id: Identity) -> anyhow::Result<Option<UserNode>> {
        self.get_user(id).await
    }

    async fn get_group(&self, id: Identity) -> anyhow::Result<Option<GroupNode>> {
        self.get_group(id).await
    }

    async fn count_users(&self) -> anyhow::Result<i64> {
        self.count_users().await
    }

    async fn count_groups(&self) -> anyhow::Result<i64> {
        self.count_groups().await
    }

    async fn count_edges(&self, kind: EdgeKind) -> anyhow::Result<i64> {
        self.count_edges(kind).await
    }

    async fn top_users_by_followers(&self, limit: usize) -> anyhow::Result<Vec<RankedEntry>> {
        self.top_users_by_followers(limit).await
    }

    async fn top_groups_by_subscribers(&self, limit: usize) -> anyhow::Result<Vec<RankedEntry>> {
        self.top_groups_by_subscribers(limit).await
    }

    async fn mutual_followers(&self) -> anyhow::Result<Vec<MutualPair>> {
        self.mutual_followers().await
    }
}
