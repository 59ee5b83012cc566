//! Aggregate queries over the stored graph and report rendering

use crate::neo4j::{EdgeKind, GraphStore, MutualPair, RankedEntry};
use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;

/// Default size of the top-K lists
pub const DEFAULT_TOP_K: usize = 5;

/// How a [`Report`] is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Summary of the stored graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub total_users: i64,
    pub total_groups: i64,
    pub total_follow_edges: i64,
    pub total_subscribe_edges: i64,
    pub top_k: usize,
    pub top_users: Vec<RankedEntry>,
    pub top_groups: Vec<RankedEntry>,
    pub mutual_followers: Vec<MutualPair>,
}

impl Report {
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Total users: {}", self.total_users);
        let _ = writeln!(out, "Total groups: {}", self.total_groups);
        let _ = writeln!(
            out,
            "Relationships: {} FOLLOW, {} SUBSCRIBE",
            self.total_follow_edges, self.total_subscribe_edges
        );

        let _ = writeln!(out, "\nTop {} users by followers:", self.top_k);
        write_ranking(&mut out, &self.top_users, "followers");

        let _ = writeln!(out, "\nTop {} groups by subscribers:", self.top_k);
        write_ranking(&mut out, &self.top_groups, "subscribers");

        let _ = writeln!(out, "\nMutual followers:");
        if self.mutual_followers.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for pair in &self.mutual_followers {
            let _ = writeln!(out, "  {} <-> {}", pair.user1, pair.user2);
        }
        out
    }
}

fn write_ranking(out: &mut String, entries: &[RankedEntry], unit: &str) {
    if entries.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (rank, entry) in entries.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}: {} {}", rank + 1, entry.id, entry.count, unit);
    }
}

/// Read-only analytics over a [`GraphStore`]
pub struct AnalyticsReporter {
    store: Arc<dyn GraphStore>,
}

impl AnalyticsReporter {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    pub async fn total_users(&self) -> Result<i64> {
        self.store.count_users().await
    }

    pub async fn total_groups(&self) -> Result<i64> {
        self.store.count_groups().await
    }

    /// Users ranked by FOLLOW in-degree, ties by identity ascending.
    /// Users nobody follows are not listed.
    pub async fn top_users_by_followers(&self, k: usize) -> Result<Vec<RankedEntry>> {
        self.store.top_users_by_followers(k).await
    }

    /// Groups ranked by SUBSCRIBE in-degree, ties by identity ascending
    pub async fn top_groups_by_subscribers(&self, k: usize) -> Result<Vec<RankedEntry>> {
        self.store.top_groups_by_subscribers(k).await
    }

    /// Reciprocal follow pairs, each listed once
    pub async fn mutual_followers(&self) -> Result<Vec<MutualPair>> {
        self.store.mutual_followers().await
    }

    /// Run every query and bundle the results
    pub async fn build_report(&self, k: usize) -> Result<Report> {
        Ok(Report {
            total_users: self.total_users().await?,
            total_groups: self.total_groups().await?,
            total_follow_edges: self.store.count_edges(EdgeKind::Follow).await?,
            total_subscribe_edges: self.store.count_edges(EdgeKind::Subscribe).await?,
            top_k: k,
            top_users: self.top_users_by_followers(k).await?,
            top_groups: self.top_groups_by_subscribers(k).await?,
            mutual_followers: self.mutual_followers().await?,
        })
    }
}
