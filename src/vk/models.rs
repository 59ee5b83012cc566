//! VK API models: identities, user profiles and group records

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identity
// ============================================================================

/// Numeric VK handle of a user or a group. Natural key of every graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub i64);

impl Identity {
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Identity {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for Identity {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

// ============================================================================
// Sex
// ============================================================================

/// VK encodes sex as 0 (unknown), 1 (female), 2 (male).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    #[default]
    Unknown,
    Female,
    Male,
}

impl Sex {
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Sex::Female,
            2 => Sex::Male,
            _ => Sex::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Unknown => "unknown",
            Sex::Female => "female",
            Sex::Male => "male",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(Sex::Unknown),
            "female" => Ok(Sex::Female),
            "male" => Ok(Sex::Male),
            other => Err(format!("Invalid sex: {}", other)),
        }
    }
}

// ============================================================================
// Profiles
// ============================================================================

/// Snapshot of a user profile at fetch time.
///
/// Every field the API may omit is an `Option`, so an absent field is never
/// confused with an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Identity,
    pub screen_name: Option<String>,
    /// "first_name last_name"
    pub display_name: String,
    #[serde(default)]
    pub sex: Sex,
    pub home_town: Option<String>,
    pub about: Option<String>,
    pub photo_max: Option<String>,
    #[serde(default)]
    pub followers_count: Option<u64>,
}

/// A community (group, public page or event) as returned by `extended=1` calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupProfile {
    pub id: Identity,
    pub name: String,
    pub screen_name: Option<String>,
}

// ============================================================================
// Raw wire shapes
// ============================================================================

/// `users.get` item as sent by VK.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub screen_name: Option<String>,
    #[serde(default)]
    pub sex: u8,
    pub home_town: Option<String>,
    pub about: Option<String>,
    pub photo_max: Option<String>,
    pub followers_count: Option<u64>,
}

impl From<RawUser> for UserProfile {
    fn from(raw: RawUser) -> Self {
        let display_name = format!("{} {}", raw.first_name, raw.last_name)
            .trim()
            .to_string();
        Self {
            id: Identity(raw.id),
            screen_name: raw.screen_name,
            display_name,
            sex: Sex::from_code(raw.sex),
            home_town: raw.home_town,
            about: raw.about,
            photo_max: raw.photo_max,
            followers_count: raw.followers_count,
        }
    }
}

/// Item of an extended subscription/group listing. Subscriptions mix
/// communities with followed profiles; only items carrying a `name` are groups.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawCommunity {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: Option<String>,
    pub screen_name: Option<String>,
}

impl RawCommunity {
    pub fn into_group(self) -> Option<GroupProfile> {
        if self.kind.as_deref() == Some("profile") {
            return None;
        }
        let name = self.name?;
        Some(GroupProfile {
            id: Identity(self.id),
            name,
            screen_name: self.screen_name,
        })
    }
}

/// `{count, items}` envelope shared by list methods.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ItemList<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

// ============================================================================
// Snapshot
// ============================================================================

/// Raw dump of one account, written by the `snapshot` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub user_info: UserProfile,
    pub followers: Vec<Identity>,
    pub subscriptions: Vec<GroupProfile>,
    pub groups: Vec<GroupProfile>,
    pub fetched_at: chrono::DateTime<chrono::Utc>,
}
