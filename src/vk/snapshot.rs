//! One-shot account dump (`snapshot` command)

use super::models::{AccountSnapshot, Identity};
use super::traits::SocialGraphClient;
use anyhow::{Context, Result};
use std::path::Path;

/// Fetch profile, followers, subscriptions and groups of a single account.
///
/// Unlike a crawl, any failed call aborts the snapshot: a partial dump would be
/// indistinguishable from an account that genuinely has no data.
pub async fn fetch_snapshot(
    client: &dyn SocialGraphClient,
    id: Identity,
    followers_limit: u32,
) -> Result<AccountSnapshot> {
    let user_info = client
        .get_profile(id)
        .await
        .with_context(|| format!("Failed to fetch profile of {}", id))?;
    let followers = client
        .get_followers(id, followers_limit)
        .await
        .with_context(|| format!("Failed to fetch followers of {}", id))?;
    let subscriptions = client
        .get_subscriptions(id)
        .await
        .with_context(|| format!("Failed to fetch subscriptions of {}", id))?;
    let groups = client
        .get_groups(id)
        .await
        .with_context(|| format!("Failed to fetch groups of {}", id))?;

    Ok(AccountSnapshot {
        user_info,
        followers,
        subscriptions,
        groups,
        fetched_at: chrono::Utc::now(),
    })
}

/// Write a snapshot as pretty-printed JSON
pub fn write_snapshot(snapshot: &AccountSnapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "Snapshot saved");
    Ok(())
}
