//! Test helper factories and mock state builders
//!
//! Provides convenience functions for creating test objects with sensible defaults,
//! and helpers for building mock AppState instances.
#![allow(dead_code)]

use crate::neo4j::mock::MockGraphStore;
use crate::neo4j::{GroupNode, UserNode};
use crate::vk::mock::MockSocialClient;
use crate::vk::{GroupProfile, Identity, Sex, UserProfile};
use crate::{AppState, Config};
use std::sync::Arc;

// ============================================================================
// Mock state builders
// ============================================================================

/// Runtime config pointing at mock backends
pub fn test_config() -> Config {
    Config {
        neo4j_uri: "bolt://mock:7687".to_string(),
        neo4j_user: "neo4j".to_string(),
        neo4j_password: "mock".to_string(),
        vk_access_token: "mock-token".to_string(),
        vk_api_url: "http://mock".to_string(),
        vk_api_version: "5.131".to_string(),
        vk_max_concurrent: 3,
        vk_timeout_secs: 5,
        seed: Some(Identity(1)),
        depth: 2,
        followers_limit: 100,
        crawl_concurrency: 2,
        include_seed: false,
        ingest_concurrency: 2,
        top_k: 5,
    }
}

/// Create a mock AppState around the given in-memory backends
pub fn mock_app_state_with(client: Arc<MockSocialClient>, store: Arc<MockGraphStore>) -> AppState {
    AppState {
        store,
        client,
        config: Arc::new(test_config()),
    }
}

// ============================================================================
// Entity factories
// ============================================================================

pub fn test_profile(id: i64) -> UserProfile {
    UserProfile {
        id: Identity(id),
        screen_name: Some(format!("id{}", id)),
        display_name: format!("User {}", id),
        sex: Sex::Female,
        home_town: Some("moscow".to_string()),
        about: None,
        photo_max: Some(format!("https://vk.com/images/{}.jpg", id)),
        followers_count: None,
    }
}

pub fn test_group(id: i64) -> GroupProfile {
    GroupProfile {
        id: Identity(id),
        name: format!("Group {}", id),
        screen_name: Some(format!("club{}", id)),
    }
}

pub fn test_user_node(id: i64) -> UserNode {
    crate::ingest::user_node(&test_profile(id))
}

pub fn test_group_node(id: i64) -> GroupNode {
    GroupNode::from(&test_group(id))
}
