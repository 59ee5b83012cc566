//! In-memory mock implementation of GraphStore for testing.
//!
//! Nodes live in `tokio::sync::RwLock<HashMap<Identity, _>>` maps and edges in
//! ordered-pair sets, which gives the same merge semantics as the Cypher MERGE
//! statements in `Neo4jClient`.

use crate::neo4j::models::*;
use crate::neo4j::traits::GraphStore;
use crate::vk::models::Identity;
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, HashSet};
use tokio::sync::RwLock;

/// In-memory mock implementation of GraphStore for testing.
pub struct MockGraphStore {
    pub users: RwLock<HashMap<Identity, UserNode>>,
    pub groups: RwLock<HashMap<Identity, GroupNode>>,
    pub follows: RwLock<HashSet<(Identity, Identity)>>,
    pub subscribes: RwLock<HashSet<(Identity, Identity)>>,
    /// Identities whose node writes fail, to exercise write-error isolation
    pub failing_writes: RwLock<HashSet<Identity>>,
}

impl MockGraphStore {
    /// Create a new empty MockGraphStore.
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            groups: RwLock::new(HashMap::new()),
            follows: RwLock::new(HashSet::new()),
            subscribes: RwLock::new(HashSet::new()),
            failing_writes: RwLock::new(HashSet::new()),
        }
    }

    pub async fn fail_writes_for(&self, id: i64) {
        self.failing_writes.write().await.insert(Identity(id));
    }

    async fn check_write(&self, id: Identity) -> Result<()> {
        if self.failing_writes.read().await.contains(&id) {
            bail!("scripted write failure for {}", id);
        }
        Ok(())
    }
}

impl Default for MockGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Rank edge targets by in-degree, ties by identity ascending
fn rank_in_degree(edges: &HashSet<(Identity, Identity)>, limit: usize) -> Vec<RankedEntry> {
    let mut degrees: HashMap<Identity, i64> = HashMap::new();
    for (_, target) in edges {
        *degrees.entry(*target).or_insert(0) += 1;
    }
    let mut ranked: Vec<RankedEntry> = degrees
        .into_iter()
        .map(|(id, count)| RankedEntry { id, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.id.cmp(&b.id)));
    ranked.truncate(limit);
    ranked
}

#[async_trait]
impl GraphStore for MockGraphStore {
    async fn upsert_user(&self, user: &UserNode) -> Result<()> {
        self.check_write(user.id).await?;
        self.users.write().await.insert(user.id, user.clone());
        Ok(())
    }

    async fn upsert_group(&self, group: &GroupNode) -> Result<()> {
        self.check_write(group.id).await?;
        self.groups.write().await.insert(group.id, group.clone());
        Ok(())
    }

    async fn upsert_follow_edge(&self, follower: Identity, followee: Identity) -> Result<bool> {
        if follower == followee {
            return Ok(false);
        }
        {
            let users = self.users.read().await;
            if !users.contains_key(&follower) || !users.contains_key(&followee) {
                return Ok(false);
            }
        }
        self.follows.write().await.insert((follower, followee));
        Ok(true)
    }

    async fn upsert_subscribe_edge(&self, subscriber: Identity, group: Identity) -> Result<bool> {
        if !self.users.read().await.contains_key(&subscriber)
            || !self.groups.read().await.contains_key(&group)
        {
            return Ok(false);
        }
        self.subscribes.write().await.insert((subscriber, group));
        Ok(true)
    }

    async fn get_user(&self, id: Identity) -> Result<Option<UserNode>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_group(&self, id: Identity) -> Result<Option<GroupNode>> {
        Ok(self.groups.read().await.get(&id).cloned())
    }

    async fn count_users(&self) -> Result<i64> {
        Ok(self.users.read().await.len() as i64)
    }

    async fn count_groups(&self) -> Result<i64> {
        Ok(self.groups.read().await.len() as i64)
    }

    async fn count_edges(&self, kind: EdgeKind) -> Result<i64> {
        let total = match kind {
            EdgeKind::Follow => self.follows.read().await.len(),
            EdgeKind::Subscribe => self.subscribes.read().await.len(),
        };
        Ok(total as i64)
    }

    async fn top_users_by_followers(&self, limit: usize) -> Result<Vec<RankedEntry>> {
        Ok(rank_in_degree(&*self.follows.read().await, limit))
    }

    async fn top_groups_by_subscribers(&self, limit: usize) -> Result<Vec<RankedEntry>> {
        Ok(rank_in_degree(&*self.subscribes.read().await, limit))
    }

    async fn mutual_followers(&self) -> Result<Vec<MutualPair>> {
        let follows = self.follows.read().await;
        let pairs: BTreeSet<MutualPair> = follows
            .iter()
            .filter(|(a, b)| a < b && follows.contains(&(*b, *a)))
            .map(|(a, b)| MutualPair::new(*a, *b))
            .collect();
        Ok(pairs.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[tokio::test]
    async fn test_upsert_user_is_idempotent_last_write_wins() {
        let store = MockGraphStore::new();
        let mut user = test_user_node(1);
        store.upsert_user(&user).await.unwrap();
        store.upsert_user(&user).await.unwrap();

        user.home_town = Some("Kazan".to_string());
        store.upsert_user(&user).await.unwrap();

        assert_eq!(store.count_users().await.unwrap(), 1);
        let stored = store.get_user(Identity(1)).await.unwrap().unwrap();
        assert_eq!(stored.home_town.as_deref(), Some("Kazan"));
    }

    #[tokio::test]
    async fn test_edge_requires_both_endpoints() {
        let store = MockGraphStore::new();
        store.upsert_user(&test_user_node(1)).await.unwrap();

        assert!(!store
            .upsert_follow_edge(Identity(1), Identity(2))
            .await
            .unwrap());
        assert!(!store
            .upsert_subscribe_edge(Identity(1), Identity(100))
            .await
            .unwrap());
        assert_eq!(store.count_edges(EdgeKind::Follow).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_self_edge_rejected() {
        let store = MockGraphStore::new();
        store.upsert_user(&test_user_node(1)).await.unwrap();
        assert!(!store
            .upsert_follow_edge(Identity(1), Identity(1))
            .await
            .unwrap());
        assert!(store.mutual_followers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_to_group_with_same_numeric_id() {
        let store = MockGraphStore::new();
        store.upsert_user(&test_user_node(7)).await.unwrap();
        store.upsert_group(&test_group_node(7)).await.unwrap();

        assert!(store
            .upsert_subscribe_edge(Identity(7), Identity(7))
            .await
            .unwrap());
        assert_eq!(store.count_edges(EdgeKind::Subscribe).await.unwrap(), 1);
    }
}
