//! Ingestion pipeline: collect, filter, enrich, persist, report.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::pacer::Pacer;
use super::Source;
use crate::article::{ArticleStore, NewArticle, Platform};
use crate::enrich::Enricher;
use crate::{DigestError, Result};

/// Outcome of one ingestion run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestReport {
    pub platform: Platform,
    pub success: bool,
    /// Newly stored articles.
    pub count: usize,
    /// Drafts that were already known or failed to insert.
    pub skipped: usize,
    /// Drafts summarized by this run's enrich stage.
    pub enriched: usize,
    pub tokens_used: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IngestReport {
    fn failed(platform: Platform, message: String) -> Self {
        Self {
            platform,
            success: false,
            count: 0,
            skipped: 0,
            enriched: 0,
            tokens_used: 0,
            error: Some(message),
        }
    }
}

/// Ingestion orchestrator.
pub struct IngestPipeline {
    store: Arc<dyn ArticleStore>,
    enricher: Arc<dyn Enricher>,
    sources: Vec<Arc<dyn Source>>,
    batch_size: usize,
    batch_pacer: Arc<dyn Pacer>,
}

impl IngestPipeline {
    /// Create a pipeline. A zero batch size is treated as one.
    pub fn new(
        store: Arc<dyn ArticleStore>,
        enricher: Arc<dyn Enricher>,
        sources: Vec<Arc<dyn Source>>,
        batch_size: usize,
        batch_pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            store,
            enricher,
            sources,
            batch_size: batch_size.max(1),
            batch_pacer,
        }
    }

    /// Platforms with at least one configured source.
    pub fn platforms(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| self.sources.iter().any(|s| s.platform() == *p))
            .collect()
    }

    /// Run ingestion for one platform.
    ///
    /// Source, enrichment and per-item insert failures only reduce the
    /// count. The report is unsuccessful only when the store is unreachable
    /// or no source is configured for the platform.
    pub async fn run(&self, platform: Platform) -> IngestReport {
        info!(%platform, "Starting ingestion");
        match self.try_run(platform).await {
            Ok(report) => {
                info!(
                    %platform,
                    count = report.count,
                    skipped = report.skipped,
                    enriched = report.enriched,
                    tokens = report.tokens_used,
                    "Ingestion finished"
                );
                report
            }
            Err(e) => {
                error!(%platform, error = %e, "Ingestion failed");
                IngestReport::failed(platform, e.to_string())
            }
        }
    }

    /// Run ingestion for every configured platform, one after another.
    pub async fn run_all(&self) -> Vec<IngestReport> {
        let mut reports = Vec::new();
        for platform in self.platforms() {
            reports.push(self.run(platform).await);
        }
        reports
    }

    async fn try_run(&self, platform: Platform) -> Result<IngestReport> {
        self.store.ping().await?;

        let sources: Vec<&Arc<dyn Source>> = self
            .sources
            .iter()
            .filter(|s| s.platform() == platform)
            .collect();
        if sources.is_empty() {
            return Err(DigestError::Config(format!(
                "no sources configured for platform {platform}"
            )));
        }

        let drafts = collect(&sources).await;
        let collected = drafts.len();

        let mut fresh = self.filter_known(drafts).await;
        let known = collected - fresh.len();
        debug!(%platform, collected, known, "Filtered known articles");

        let (enriched, tokens_used) = self.enrich(&mut fresh).await;

        let summary = self.store.insert_many(&fresh).await;

        Ok(IngestReport {
            platform,
            success: true,
            count: summary.inserted,
            skipped: known + summary.skipped,
            enriched,
            tokens_used,
            error: None,
        })
    }

    async fn filter_known(&self, drafts: Vec<NewArticle>) -> Vec<NewArticle> {
        let mut fresh = Vec::with_capacity(drafts.len());
        for draft in drafts {
            if !self.store.exists(&draft.source_url).await {
                fresh.push(draft);
            }
        }
        fresh
    }

    /// Summarize drafts that aren't enriched yet, batch by batch.
    ///
    /// Returns the number of drafts enriched and the tokens spent.
    async fn enrich(&self, drafts: &mut [NewArticle]) -> (usize, u64) {
        let pending: Vec<usize> = drafts
            .iter()
            .enumerate()
            .filter(|(_, d)| !d.is_enriched())
            .map(|(i, _)| i)
            .collect();

        let mut enriched = 0;
        let mut tokens_used = 0u64;

        for batch in pending.chunks(self.batch_size) {
            self.batch_pacer.ready().await;

            let results = {
                let view: &[NewArticle] = drafts;
                let calls = batch.iter().map(|&i| {
                    let draft = &view[i];
                    self.enricher.summarize(&draft.title, &draft.body)
                });
                join_all(calls).await
            };

            for (&i, result) in batch.iter().zip(results) {
                match result {
                    Some(summary) => {
                        tokens_used += u64::from(summary.tokens_used);
                        drafts[i].apply_summary(summary);
                        enriched += 1;
                    }
                    None => {
                        warn!(title = %drafts[i].title, "Storing article without summary");
                    }
                }
            }
        }

        (enriched, tokens_used)
    }
}

/// Fetch every source concurrently. A failing source contributes nothing.
async fn collect(sources: &[&Arc<dyn Source>]) -> Vec<NewArticle> {
    let results = join_all(sources.iter().map(|s| s.fetch())).await;

    let mut drafts = Vec::new();
    for (source, result) in sources.iter().zip(results) {
        match result {
            Ok(items) => drafts.extend(items),
            Err(e) => warn!(source = source.name(), error = %e, "Source failed, skipping"),
        }
    }
    drafts
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::article::{article_id, ArticleRepository, ContentType};
    use crate::enrich::{Digest, Summary};
    use crate::ingest::pacer::Unpaced;
    use crate::Database;

    struct StaticSource {
        platform: Platform,
        urls: Vec<&'static str>,
        fail: bool,
    }

    #[async_trait]
    impl Source for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        fn platform(&self) -> Platform {
            self.platform
        }

        async fn fetch(&self) -> Result<Vec<NewArticle>> {
            if self.fail {
                return Err(DigestError::Feed("HTTP error: 500".to_string()));
            }
            Ok(self
                .urls
                .iter()
                .map(|u| NewArticle::new(*u, format!("Title {u}"), self.platform, ContentType::Blog))
                .collect())
        }
    }

    /// Summarizes every title except those containing "fail".
    #[derive(Default)]
    struct CountingEnricher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Enricher for CountingEnricher {
        async fn summarize(&self, title: &str, _body: &str) -> Option<Summary> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if title.contains("fail") {
                return None;
            }
            Some(Summary {
                title_translated: format!("번역 {title}"),
                summary_translated: "요약".to_string(),
                keywords: vec!["Kotlin".to_string()],
                tokens_used: 10,
            })
        }

        async fn elaborate(&self, _title: &str, _body: &str) -> Option<Digest> {
            None
        }
    }

    fn pipeline(
        db: &Database,
        enricher: Arc<CountingEnricher>,
        sources: Vec<StaticSource>,
    ) -> IngestPipeline {
        IngestPipeline::new(
            Arc::new(ArticleRepository::new(db.pool())),
            enricher,
            sources
                .into_iter()
                .map(|s| Arc::new(s) as Arc<dyn Source>)
                .collect(),
            2,
            Arc::new(Unpaced),
        )
    }

    #[tokio::test]
    async fn test_run_is_idempotent() {
        let db = Database::open_in_memory().await.unwrap();
        let enricher = Arc::new(CountingEnricher::default());
        let pipeline = pipeline(
            &db,
            enricher.clone(),
            vec![StaticSource {
                platform: Platform::Android,
                urls: vec!["https://x/1", "https://x/2", "https://x/3"],
                fail: false,
            }],
        );

        let first = pipeline.run(Platform::Android).await;
        assert!(first.success);
        assert_eq!(first.count, 3);
        assert_eq!(first.enriched, 3);
        assert_eq!(first.tokens_used, 30);

        let second = pipeline.run(Platform::Android).await;
        assert!(second.success);
        assert_eq!(second.count, 0);
        assert_eq!(second.skipped, 3);
        assert_eq!(enricher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failing_source_is_isolated() {
        let db = Database::open_in_memory().await.unwrap();
        let pipeline = pipeline(
            &db,
            Arc::new(CountingEnricher::default()),
            vec![
                StaticSource {
                    platform: Platform::Android,
                    urls: vec![],
                    fail: true,
                },
                StaticSource {
                    platform: Platform::Android,
                    urls: vec!["https://x/ok"],
                    fail: false,
                },
            ],
        );

        let report = pipeline.run(Platform::Android).await;
        assert!(report.success);
        assert_eq!(report.count, 1);
    }

    #[tokio::test]
    async fn test_failed_enrichment_still_persists() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = ArticleRepository::new(db.pool());
        let pipeline = pipeline(
            &db,
            Arc::new(CountingEnricher::default()),
            vec![StaticSource {
                platform: Platform::Ios,
                urls: vec!["https://x/fail", "https://x/fine"],
                fail: false,
            }],
        );

        let report = pipeline.run(Platform::Ios).await;
        assert_eq!(report.count, 2);
        assert_eq!(report.enriched, 1);

        let failed = repo.get_by_id(&article_id("https://x/fail")).await.unwrap().unwrap();
        assert!(failed.title_translated.is_none());
        assert!(failed.summary_translated.is_none());

        let fine = repo.get_by_id(&article_id("https://x/fine")).await.unwrap().unwrap();
        assert_eq!(fine.title_translated.as_deref(), Some("번역 Title https://x/fine"));
        assert_eq!(fine.keywords, Some(vec!["Kotlin".to_string()]));
    }

    #[tokio::test]
    async fn test_no_sources_for_platform_fails() {
        let db = Database::open_in_memory().await.unwrap();
        let pipeline = pipeline(
            &db,
            Arc::new(CountingEnricher::default()),
            vec![StaticSource {
                platform: Platform::Android,
                urls: vec!["https://x/1"],
                fail: false,
            }],
        );

        let report = pipeline.run(Platform::Backend).await;
        assert!(!report.success);
        assert_eq!(report.count, 0);
        assert!(report.error.unwrap().contains("no sources configured"));
        assert_eq!(pipeline.platforms(), vec![Platform::Android]);
    }

    #[tokio::test]
    async fn test_run_all_covers_configured_platforms() {
        let db = Database::open_in_memory().await.unwrap();
        let pipeline = pipeline(
            &db,
            Arc::new(CountingEnricher::default()),
            vec![
                StaticSource {
                    platform: Platform::Web,
                    urls: vec!["https://x/web"],
                    fail: false,
                },
                StaticSource {
                    platform: Platform::Android,
                    urls: vec!["https://x/a1", "https://x/a2"],
                    fail: false,
                },
            ],
        );

        let reports = pipeline.run_all().await;
        let summary: Vec<_> = reports.iter().map(|r| (r.platform, r.count)).collect();
        assert_eq!(summary, vec![(Platform::Android, 2), (Platform::Web, 1)]);
    }

    /// Records how many summarize calls overlap.
    #[derive(Default)]
    struct InFlightEnricher {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        /// Calls that started while nothing else was running.
        idle_starts: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Enricher for InFlightEnricher {
        async fn summarize(&self, _title: &str, _body: &str) -> Option<Summary> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let before = self.in_flight.fetch_add(1, Ordering::SeqCst);
            if before == 0 {
                self.idle_starts.fetch_add(1, Ordering::SeqCst);
            }
            self.max_in_flight.fetch_max(before + 1, Ordering::SeqCst);

            tokio::time::sleep(std::time::Duration::from_millis(20)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            None
        }

        async fn elaborate(&self, _title: &str, _body: &str) -> Option<Digest> {
            None
        }
    }

    #[tokio::test]
    async fn test_enrichment_batches_are_bounded_and_sequential() {
        let db = Database::open_in_memory().await.unwrap();
        let enricher = Arc::new(InFlightEnricher::default());
        let pipeline = IngestPipeline::new(
            Arc::new(ArticleRepository::new(db.pool())),
            enricher.clone(),
            vec![Arc::new(StaticSource {
                platform: Platform::Android,
                urls: vec![
                    "https://x/b1",
                    "https://x/b2",
                    "https://x/b3",
                    "https://x/b4",
                    "https://x/b5",
                ],
                fail: false,
            }) as Arc<dyn Source>],
            2,
            Arc::new(Unpaced),
        );

        let report = pipeline.run(Platform::Android).await;

        assert_eq!(report.count, 5);
        assert_eq!(enricher.calls.load(Ordering::SeqCst), 5);
        assert_eq!(enricher.max_in_flight.load(Ordering::SeqCst), 2);
        // Three batches of at most two, each starting after the previous one settled.
        assert_eq!(enricher.idle_starts.load(Ordering::SeqCst), 3);
        assert_eq!(enricher.in_flight.load(Ordering::SeqCst), 0);
    }
}
