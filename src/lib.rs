//! Social Graph Crawler
//!
//! Crawls the VK follow/subscription graph around a seed account and
//! materializes it in Neo4j:
//! - Depth-bounded crawler with cycle-safe, failure-isolated traversal
//! - Idempotent ingestion of users, groups and FOLLOW/SUBSCRIBE edges
//! - Aggregate analytics (totals, top-K by in-degree, mutual followers)

pub mod analytics;
pub mod crawler;
pub mod ingest;
pub mod neo4j;
pub mod orchestrator;
pub mod vk;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use vk::Identity;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub vk: VkYamlConfig,
    pub neo4j: Neo4jYamlConfig,
    pub crawl: CrawlYamlConfig,
    pub ingest: IngestYamlConfig,
    pub report: ReportYamlConfig,
}

/// VK API section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VkYamlConfig {
    pub access_token: Option<String>,
    pub api_url: String,
    pub api_version: String,
    /// Ceiling on in-flight API calls
    pub max_concurrent: usize,
    pub timeout_secs: u64,
}

impl Default for VkYamlConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            api_url: vk::client::DEFAULT_API_URL.into(),
            api_version: vk::client::DEFAULT_API_VERSION.into(),
            max_concurrent: 3,
            timeout_secs: 10,
        }
    }
}

/// Neo4j configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jYamlConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for Neo4jYamlConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".into(),
            user: "neo4j".into(),
            password: "neo4j".into(),
        }
    }
}

/// Crawl section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlYamlConfig {
    pub seed: Option<i64>,
    pub depth: u32,
    pub followers_limit: u32,
    pub concurrency: usize,
    /// Ingest the seed itself as a user (with its own SUBSCRIBE edges)
    pub include_seed: bool,
}

impl Default for CrawlYamlConfig {
    fn default() -> Self {
        Self {
            seed: None,
            depth: 2,
            followers_limit: crawler::DEFAULT_FOLLOWERS_LIMIT,
            concurrency: 4,
            include_seed: false,
        }
    }
}

/// Ingestion section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestYamlConfig {
    pub concurrency: usize,
}

impl Default for IngestYamlConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

/// Report section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportYamlConfig {
    pub top_k: usize,
}

impl Default for ReportYamlConfig {
    fn default() -> Self {
        Self {
            top_k: analytics::DEFAULT_TOP_K,
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub vk_access_token: String,
    pub vk_api_url: String,
    pub vk_api_version: String,
    pub vk_max_concurrent: usize,
    pub vk_timeout_secs: u64,
    pub seed: Option<Identity>,
    pub depth: u32,
    pub followers_limit: u32,
    pub crawl_concurrency: usize,
    pub include_seed: bool,
    pub ingest_concurrency: usize,
    pub top_k: usize,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("neo4j_uri", &self.neo4j_uri)
            .field("neo4j_user", &self.neo4j_user)
            .field("vk_api_url", &self.vk_api_url)
            .field("vk_api_version", &self.vk_api_version)
            .field("seed", &self.seed)
            .field("depth", &self.depth)
            .field("followers_limit", &self.followers_limit)
            .field("include_seed", &self.include_seed)
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}

/// Read and parse an optional numeric environment variable
fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Invalid {}={:?}: {}", name, raw, e)),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Load configuration from environment variables only.
    /// Equivalent to from_yaml_and_env(None).
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. A missing file falls
    /// back to env vars / defaults; a file that exists but does not parse is an error.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        // 1. Load YAML config (or defaults if file not found)
        let yaml = Self::load_yaml(yaml_path)?;

        let seed = match env_parse::<i64>("VK_USER_ID")? {
            Some(id) => Some(id),
            None => yaml.crawl.seed,
        };

        // 2. Build Config with env var overrides
        Ok(Self {
            neo4j_uri: std::env::var("NEO4J_URI").unwrap_or(yaml.neo4j.uri),
            neo4j_user: std::env::var("NEO4J_USER").unwrap_or(yaml.neo4j.user),
            neo4j_password: std::env::var("NEO4J_PASSWORD").unwrap_or(yaml.neo4j.password),
            vk_access_token: std::env::var("VK_ACCESS_TOKEN")
                .ok()
                .or(yaml.vk.access_token)
                .unwrap_or_default(),
            vk_api_url: yaml.vk.api_url,
            vk_api_version: yaml.vk.api_version,
            vk_max_concurrent: yaml.vk.max_concurrent,
            vk_timeout_secs: yaml.vk.timeout_secs,
            seed: seed.map(Identity),
            depth: env_parse("DEPTH")?.unwrap_or(yaml.crawl.depth),
            followers_limit: yaml.crawl.followers_limit,
            crawl_concurrency: yaml.crawl.concurrency,
            include_seed: yaml.crawl.include_seed,
            ingest_concurrency: yaml.ingest.concurrency,
            top_k: env_parse("TOP_N")?.unwrap_or(yaml.report.top_k),
        })
    }

    /// Load and parse a YAML config file. Returns defaults if the file is absent.
    fn load_yaml(yaml_path: Option<&Path>) -> Result<YamlConfig> {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let config = serde_yaml::from_str(&contents)
                    .with_context(|| format!("Failed to parse {}", path.display()))?;
                tracing::info!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                Ok(YamlConfig::default())
            }
        }
    }

    /// Checks shared by every command
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            bail!("top_k must be a positive integer");
        }
        if self.neo4j_uri.trim().is_empty() {
            bail!("NEO4J_URI is not set");
        }
        Ok(())
    }

    /// Checks required before any VK call
    pub fn validate_for_crawl(&self) -> Result<()> {
        self.validate()?;
        if self.vk_access_token.trim().is_empty() {
            bail!("VK_ACCESS_TOKEN is not set");
        }
        if self.seed.is_none() {
            bail!("Seed user is not set (VK_USER_ID or crawl.seed)");
        }
        if self.depth == 0 {
            bail!("depth must be a positive integer");
        }
        Ok(())
    }

    /// Seed identity; call after `validate_for_crawl`
    pub fn seed(&self) -> Result<Identity> {
        self.seed.context("Seed user is not set")
    }

    pub fn vk_timeout(&self) -> Duration {
        Duration::from_secs(self.vk_timeout_secs)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn neo4j::GraphStore>,
    pub client: Arc<dyn vk::SocialGraphClient>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Connect to Neo4j and build the VK client. Any failure here is fatal.
    pub async fn new(config: Config) -> Result<Self> {
        let store = Arc::new(
            neo4j::client::Neo4jClient::new(
                &config.neo4j_uri,
                &config.neo4j_user,
                &config.neo4j_password,
            )
            .await?,
        );

        let client = Self::vk_client(&config)?;

        Ok(Self {
            store,
            client,
            config: Arc::new(config),
        })
    }

    /// Build only the VK client (commands that never touch Neo4j)
    pub fn vk_client(config: &Config) -> Result<Arc<dyn vk::SocialGraphClient>> {
        let client = vk::client::VkClient::new(
            &config.vk_api_url,
            &config.vk_access_token,
            &config.vk_api_version,
            config.vk_max_concurrent,
            config.vk_timeout(),
        )
        .context("Failed to create VK client")?;
        Ok(Arc::new(client))
    }
}

// ============================================================================
// Tests
// ============================================================================
