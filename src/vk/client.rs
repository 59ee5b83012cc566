//! HTTP client for the VK API

use super::error::{Result, VkError};
use super::models::*;
use super::traits::SocialGraphClient;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Semaphore;

pub const DEFAULT_API_URL: &str = "https://api.vk.com";
pub const DEFAULT_API_VERSION: &str = "5.131";

/// Profile fields requested from `users.get`
const PROFILE_FIELDS: &str = "screen_name,sex,home_town,about,photo_max,followers_count";

/// Response envelope: VK answers with either `response` or `error`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: Option<T>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error_code: i64,
    #[serde(default)]
    error_msg: String,
}

/// Client for the VK `method/*` endpoints.
///
/// In-flight calls are capped by a semaphore so a crawl fanning out over many
/// identities stays under the upstream rate ceiling.
pub struct VkClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    api_version: String,
    limiter: Semaphore,
}

impl VkClient {
    /// Create a new VK client
    pub fn new(
        base_url: &str,
        access_token: &str,
        api_version: &str,
        max_concurrent: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            api_version: api_version.to_string(),
            limiter: Semaphore::new(max_concurrent.max(1)),
        })
    }

    /// Invoke a VK method and unwrap its `response` payload
    async fn call<T: DeserializeOwned>(&self, method: &str, params: &[(&str, String)]) -> Result<T> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|e| VkError::Network(e.to_string()))?;

        let url = format!("{}/method/{}", self.base_url, method);
        let resp = self
            .http
            .get(&url)
            .query(params)
            .query(&[
                ("access_token", self.access_token.as_str()),
                ("v", self.api_version.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VkError::Api {
                code: i64::from(status.as_u16()),
                message: body,
            });
        }

        let body = resp.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        match envelope {
            Envelope {
                error: Some(err), ..
            } => Err(VkError::from_api(err.error_code, err.error_msg)),
            Envelope {
                response: Some(response),
                ..
            } => Ok(response),
            _ => Err(VkError::Parse(format!("{}: empty response", method))),
        }
    }

    async fn list_communities(&self, method: &str, id: Identity) -> Result<Vec<GroupProfile>> {
        let list: ItemList<RawCommunity> = self
            .call(
                method,
                &[("user_id", id.to_string()), ("extended", "1".to_string())],
            )
            .await?;

        let total = list.items.len();
        let groups: Vec<GroupProfile> = list
            .items
            .into_iter()
            .filter_map(RawCommunity::into_group)
            .collect();
        if groups.len() < total {
            tracing::debug!(
                user_id = %id,
                method,
                skipped = total - groups.len(),
                "Ignoring non-community items"
            );
        }
        Ok(groups)
    }
}

#[async_trait]
impl SocialGraphClient for VkClient {
    async fn get_profile(&self, id: Identity) -> Result<UserProfile> {
        let users: Vec<RawUser> = self
            .call(
                "users.get",
                &[
                    ("user_ids", id.to_string()),
                    ("fields", PROFILE_FIELDS.to_string()),
                    ("name_case", "nom".to_string()),
                ],
            )
            .await?;

        users
            .into_iter()
            .next()
            .map(UserProfile::from)
            .ok_or_else(|| VkError::NotFound(format!("user {}", id)))
    }

    async fn get_followers(&self, id: Identity, limit: u32) -> Result<Vec<Identity>> {
        let list: ItemList<i64> = self
            .call(
                "users.getFollowers",
                &[("user_id", id.to_string()), ("count", limit.to_string())],
            )
            .await?;
        Ok(list.items.into_iter().map(Identity).collect())
    }

    async fn get_subscriptions(&self, id: Identity) -> Result<Vec<GroupProfile>> {
        self.list_communities("users.getSubscriptions", id).await
    }

    async fn get_groups(&self, id: Identity) -> Result<Vec<GroupProfile>> {
        self.list_communities("groups.get", id).await
    }
}
