//! Neo4j graph models for users, groups and their relationships

use crate::vk::models::{GroupProfile, Identity, Sex};
use serde::{Deserialize, Serialize};

// ============================================================================
// Nodes
// ============================================================================

/// A `:User` node. Absent profile fields are stored as absent properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserNode {
    pub id: Identity,
    pub screen_name: Option<String>,
    pub name: String,
    pub sex: Sex,
    pub home_town: Option<String>,
    pub about: Option<String>,
    pub photo_max: Option<String>,
    /// Follower total reported by the API, not the stored in-degree
    pub followers_count: Option<i64>,
}

/// A `:Group` node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupNode {
    pub id: Identity,
    pub name: String,
    pub screen_name: Option<String>,
}

impl From<&GroupProfile> for GroupNode {
    fn from(group: &GroupProfile) -> Self {
        Self {
            id: group.id,
            name: group.name.clone(),
            screen_name: group.screen_name.clone(),
        }
    }
}

// ============================================================================
// Relationships
// ============================================================================

/// Relationship kinds stored in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    /// `(:User)-[:FOLLOW]->(:User)`
    Follow,
    /// `(:User)-[:SUBSCRIBE]->(:Group)`
    Subscribe,
}

impl EdgeKind {
    pub fn label(&self) -> &'static str {
        match self {
            EdgeKind::Follow => "FOLLOW",
            EdgeKind::Subscribe => "SUBSCRIBE",
        }
    }

    /// Label of the node the relationship points to
    pub fn target_label(&self) -> &'static str {
        match self {
            EdgeKind::Follow => "User",
            EdgeKind::Subscribe => "Group",
        }
    }
}

// ============================================================================
// Query results
// ============================================================================

/// A node ranked by in-degree of one relationship kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub id: Identity,
    pub count: i64,
}

/// Two users following each other, reported once with `user1 < user2`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MutualPair {
    pub user1: Identity,
    pub user2: Identity,
}

impl MutualPair {
    /// Build a pair in canonical order
    pub fn new(a: Identity, b: Identity) -> Self {
        if a <= b {
            Self { user1: a, user2: b }
        } else {
            Self { user1: b, user2: a }
        }
    }
}
