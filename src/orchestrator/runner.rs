//! Main orchestrator runner

use crate::analytics::{AnalyticsReporter, Report};
use crate::crawler::{CrawlResult, Crawler};
use crate::ingest::{IngestStats, IngestionPipeline};
use crate::AppState;
use anyhow::Result;
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

/// Outcome of a full crawl, ingest and report run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub crawl: CrawlResult,
    pub ingest: IngestStats,
    pub report: Report,
}

/// Coordinates the crawler, the ingestion pipeline and the reporter
pub struct Orchestrator {
    state: AppState,
}

impl Orchestrator {
    /// Create a new orchestrator
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    fn crawler(&self) -> Crawler {
        Crawler::new(self.state.client.clone())
            .with_followers_limit(self.state.config.followers_limit)
            .with_concurrency(self.state.config.crawl_concurrency)
    }

    fn pipeline(&self) -> IngestionPipeline {
        IngestionPipeline::new(self.state.client.clone(), self.state.store.clone())
            .with_concurrency(self.state.config.ingest_concurrency)
            .with_seed(self.state.config.include_seed)
    }

    fn reporter(&self) -> AnalyticsReporter {
        AnalyticsReporter::new(self.state.store.clone())
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Crawl from the configured seed without writing anything
    pub async fn crawl(&self) -> Result<CrawlResult> {
        self.state.config.validate_for_crawl()?;
        let seed = self.state.config.seed()?;
        Ok(self.crawler().crawl(seed, self.state.config.depth).await)
    }

    /// Crawl, ingest the result, then report on the stored graph.
    ///
    /// Per-entity API or write failures are logged and counted; only
    /// configuration errors and failing aggregate queries abort the run.
    pub async fn run(&self) -> Result<RunSummary> {
        self.state.config.validate_for_crawl()?;
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", %run_id);

        async move {
            let crawl = self.crawl().await?;
            let ingest = self.pipeline().run(&crawl).await;
            let report = self.report().await?;

            Ok(RunSummary {
                run_id,
                crawl,
                ingest,
                report,
            })
        }
        .instrument(span)
        .await
    }

    /// Report on whatever is currently stored
    pub async fn report(&self) -> Result<Report> {
        self.state.config.validate()?;
        self.reporter().build_report(self.state.config.top_k).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neo4j::mock::MockGraphStore;
    use crate::neo4j::{EdgeKind, GraphStore, MutualPair};
    use crate::test_helpers::*;
    use crate::vk::mock::{MockCall, MockSocialClient};
    use crate::vk::Identity;
    use std::sync::Arc;

    /// Seed 1 is followed by 2 and 3; 2 and 3 follow each other and both
    /// subscribe to group 100; 3 also subscribes to 200.
    async fn small_network() -> Arc<MockSocialClient> {
        let client = Arc::new(MockSocialClient::new());
        for id in 1..=3 {
            client.add_profile(test_profile(id)).await;
        }
        client.set_followers(1, &[2, 3]).await;
        client.set_followers(2, &[3]).await;
        client.set_followers(3, &[2]).await;
        client.set_subscriptions(1, vec![test_group(300)]).await;
        client.set_subscriptions(2, vec![test_group(100)]).await;
        client
            .set_subscriptions(3, vec![test_group(100), test_group(200)])
            .await;
        client
    }

    #[tokio::test]
    async fn test_run_end_to_end() {
        let client = small_network().await;
        let store = Arc::new(MockGraphStore::new());
        let orchestrator = Orchestrator::new(mock_app_state_with(client, store.clone()));

        let summary = orchestrator.run().await.unwrap();

        assert_eq!(summary.ingest.users_failed, 0);
        assert_eq!(summary.report.total_users, 2);
        // Seed is not ingested, so its own group 300 only arrives via the crawl
        assert_eq!(summary.report.total_groups, 3);
        assert_eq!(summary.report.total_subscribe_edges, 3);
        assert_eq!(
            summary.report.mutual_followers,
            vec![MutualPair::new(Identity(2), Identity(3))]
        );
        assert_eq!(summary.report.top_groups[0].id, Identity(100));
        assert_eq!(summary.report.top_groups[0].count, 2);
        assert!(store.get_user(Identity(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_run_twice_is_idempotent() {
        let client = small_network().await;
        let store = Arc::new(MockGraphStore::new());
        let orchestrator = Orchestrator::new(mock_app_state_with(client, store.clone()));

        let first = orchestrator.run().await.unwrap();
        let second = orchestrator.run().await.unwrap();

        assert_eq!(first.report, second.report);
        assert_ne!(first.run_id, second.run_id);
        assert_eq!(store.count_edges(EdgeKind::Follow).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_run_survives_api_failures() {
        let client = small_network().await;
        client.fail(2, MockCall::Profile).await;
        client.fail(3, MockCall::Subscriptions).await;
        let mut state = mock_app_state_with(client, Arc::new(MockGraphStore::new()));
        // Depth 1 lists each follower once
        let mut config = test_config();
        config.depth = 1;
        state.config = Arc::new(config);
        let orchestrator = Orchestrator::new(state);

        let summary = orchestrator.run().await.unwrap();

        assert_eq!(summary.ingest.users_failed, 1);
        assert_eq!(summary.ingest.users_written, 1);
        assert_eq!(summary.ingest.fetch_failures, 1);
        assert_eq!(summary.report.total_users, 1);
    }

    #[tokio::test]
    async fn test_run_rejects_missing_seed() {
        let mut state = mock_app_state_with(
            Arc::new(MockSocialClient::new()),
            Arc::new(MockGraphStore::new()),
        );
        let mut config = test_config();
        config.seed = None;
        state.config = Arc::new(config);

        let orchestrator = Orchestrator::new(state);
        assert!(orchestrator.run().await.is_err());
        // Reporting does not need a seed
        assert!(orchestrator.report().await.is_ok());
    }

    #[tokio::test]
    async fn test_crawl_does_not_write() {
        let client = small_network().await;
        let store = Arc::new(MockGraphStore::new());
        let orchestrator = Orchestrator::new(mock_app_state_with(client, store.clone()));

        let crawl = orchestrator.crawl().await.unwrap();
        assert_eq!(crawl.seed, Some(Identity(1)));
        assert!(!crawl.followers.is_empty());
        assert_eq!(store.count_users().await.unwrap(), 0);
    }
}
