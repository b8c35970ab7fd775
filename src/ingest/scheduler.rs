//! Periodic background ingestion.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};

use super::pipeline::{IngestPipeline, IngestReport};

/// Default interval between runs in seconds (one day).
pub const DEFAULT_INTERVAL_SECS: u64 = 86_400;

/// Runs the ingestion pipeline for every configured platform on a timer.
pub struct IngestScheduler {
    pipeline: Arc<IngestPipeline>,
    interval: Duration,
}

impl IngestScheduler {
    /// Create a scheduler with the default interval.
    pub fn new(pipeline: Arc<IngestPipeline>) -> Self {
        Self::with_interval(pipeline, DEFAULT_INTERVAL_SECS)
    }

    /// Create a scheduler with a custom interval. Zero is treated as one second.
    pub fn with_interval(pipeline: Arc<IngestPipeline>, interval_secs: u64) -> Self {
        Self {
            pipeline,
            interval: Duration::from_secs(interval_secs.max(1)),
        }
    }

    /// Run forever. The first run happens one interval after start.
    pub async fn run(&self) {
        info!(
            "Ingest scheduler started (interval: {} seconds)",
            self.interval.as_secs()
        );

        let mut timer = interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        timer.tick().await;

        loop {
            timer.tick().await;
            self.run_once().await;
        }
    }

    /// Run every configured platform once and log the outcome.
    pub async fn run_once(&self) -> Vec<IngestReport> {
        let reports = self.pipeline.run_all().await;
        for report in &reports {
            if report.success {
                info!(
                    platform = %report.platform,
                    count = report.count,
                    "Scheduled ingestion complete"
                );
            } else {
                warn!(
                    platform = %report.platform,
                    error = report.error.as_deref().unwrap_or("unknown error"),
                    "Scheduled ingestion failed"
                );
            }
        }
        reports
    }

    /// Spawn the scheduler on the current runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::article::ArticleRepository;
    use crate::enrich::OpenAiEnricher;
    use crate::ingest::pacer::Unpaced;
    use crate::Database;

    async fn empty_pipeline() -> Arc<IngestPipeline> {
        let db = Database::open_in_memory().await.unwrap();
        Arc::new(IngestPipeline::new(
            Arc::new(ArticleRepository::new(db.pool())),
            Arc::new(OpenAiEnricher::new(Default::default()).unwrap()),
            Vec::new(),
            3,
            Arc::new(Unpaced),
        ))
    }

    #[tokio::test]
    async fn test_scheduler_intervals() {
        let pipeline = empty_pipeline().await;
        let scheduler = IngestScheduler::new(pipeline.clone());
        assert_eq!(scheduler.interval, Duration::from_secs(DEFAULT_INTERVAL_SECS));

        let scheduler = IngestScheduler::with_interval(pipeline.clone(), 60);
        assert_eq!(scheduler.interval, Duration::from_secs(60));

        let scheduler = IngestScheduler::with_interval(pipeline, 0);
        assert_eq!(scheduler.interval, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_run_once_without_sources() {
        let scheduler = IngestScheduler::new(empty_pipeline().await);
        assert!(scheduler.run_once().await.is_empty());
    }
}
