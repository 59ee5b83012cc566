//! In-memory mock implementation of SocialGraphClient for testing.

use super::error::{Result, VkError};
use super::models::*;
use super::traits::SocialGraphClient;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// Which call a scripted failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockCall {
    Profile,
    Followers,
    Subscriptions,
    Groups,
}

/// In-memory social network. Unknown identities answer with empty lists and
/// `NotFound` profiles; `fail` scripts an API error for one identity and call.
pub struct MockSocialClient {
    pub profiles: RwLock<HashMap<Identity, UserProfile>>,
    pub followers: RwLock<HashMap<Identity, Vec<Identity>>>,
    pub subscriptions: RwLock<HashMap<Identity, Vec<GroupProfile>>>,
    pub groups: RwLock<HashMap<Identity, Vec<GroupProfile>>>,
    pub failures: RwLock<HashSet<(Identity, MockCall)>>,
    /// Every identity passed to `get_followers`, in call order
    pub follower_calls: RwLock<Vec<Identity>>,
    pub profile_calls: RwLock<Vec<Identity>>,
}

impl MockSocialClient {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            followers: RwLock::new(HashMap::new()),
            subscriptions: RwLock::new(HashMap::new()),
            groups: RwLock::new(HashMap::new()),
            failures: RwLock::new(HashSet::new()),
            follower_calls: RwLock::new(Vec::new()),
            profile_calls: RwLock::new(Vec::new()),
        }
    }

    pub async fn add_profile(&self, profile: UserProfile) {
        self.profiles.write().await.insert(profile.id, profile);
    }

    pub async fn set_followers(&self, id: i64, followers: &[i64]) {
        self.followers
            .write()
            .await
            .insert(Identity(id), followers.iter().copied().map(Identity).collect());
    }

    pub async fn set_subscriptions(&self, id: i64, subs: Vec<GroupProfile>) {
        self.subscriptions.write().await.insert(Identity(id), subs);
    }

    pub async fn set_groups(&self, id: i64, groups: Vec<GroupProfile>) {
        self.groups.write().await.insert(Identity(id), groups);
    }

    pub async fn fail(&self, id: i64, call: MockCall) {
        self.failures.write().await.insert((Identity(id), call));
    }

    async fn check(&self, id: Identity, call: MockCall) -> Result<()> {
        if self.failures.read().await.contains(&(id, call)) {
            return Err(VkError::Api {
                code: 30,
                message: format!("scripted {:?} failure for {}", call, id),
            });
        }
        Ok(())
    }
}

impl Default for MockSocialClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SocialGraphClient for MockSocialClient {
    async fn get_profile(&self, id: Identity) -> Result<UserProfile> {
        self.profile_calls.write().await.push(id);
        self.check(id, MockCall::Profile).await?;
        self.profiles
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| VkError::NotFound(format!("user {}", id)))
    }

    async fn get_followers(&self, id: Identity, limit: u32) -> Result<Vec<Identity>> {
        self.follower_calls.write().await.push(id);
        self.check(id, MockCall::Followers).await?;
        Ok(self
            .followers
            .read()
            .await
            .get(&id)
            .map(|f| f.iter().take(limit as usize).copied().collect())
            .unwrap_or_default())
    }

    async fn get_subscriptions(&self, id: Identity) -> Result<Vec<GroupProfile>> {
        self.check(id, MockCall::Subscriptions).await?;
        Ok(self
            .subscriptions
            .read()
            .await
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_groups(&self, id: Identity) -> Result<Vec<GroupProfile>> {
        self.check(id, MockCall::Groups).await?;
        Ok(self.groups.read().await.get(&id).cloned().unwrap_or_default())
    }
}
