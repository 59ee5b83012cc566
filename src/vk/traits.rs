//! Trait abstraction over the social network API

use super::error::Result;
use super::models::*;
use async_trait::async_trait;

/// Read-only access to a user's profile and neighbourhood.
///
/// Every call may fail with a recoverable [`VkError`](super::VkError); callers
/// treat a failure as "no data" for that identity.
#[async_trait]
pub trait SocialGraphClient: Send + Sync {
    /// Fetch a user's full profile
    async fn get_profile(&self, id: Identity) -> Result<UserProfile>;

    /// Fetch up to `limit` follower identities, in API order
    async fn get_followers(&self, id: Identity, limit: u32) -> Result<Vec<Identity>>;

    /// Fetch the communities a user is subscribed to
    async fn get_subscriptions(&self, id: Identity) -> Result<Vec<GroupProfile>>;

    /// Fetch the groups a user is a member of
    async fn get_groups(&self, id: Identity) -> Result<Vec<GroupProfile>>;
}
