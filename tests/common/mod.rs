//! Test helpers for the web API tests.
//!
//! Provides an in-memory application with a scripted enricher and static
//! sources, so no test touches the network.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{Duration, Utc};

use devdigest::article::{ArticleRepository, ArticleStore, ContentType, NewArticle, Platform};
use devdigest::config::{RuntimeConfig, MODE_DEVELOPMENT, MODE_PRODUCTION};
use devdigest::enrich::{Digest, Enricher, Summary};
use devdigest::ingest::{IngestPipeline, Source, Unpaced};
use devdigest::web::handlers::AppState;
use devdigest::web::router::create_app;
use devdigest::{Database, DigestError};

/// Cron secret used by production-mode test apps.
pub const TEST_CRON_SECRET: &str = "test-cron-secret";

/// Enricher returning canned results and counting calls.
#[derive(Default)]
pub struct FakeEnricher {
    pub summarize_calls: AtomicUsize,
    pub elaborate_calls: AtomicUsize,
    /// When set, every call fails.
    pub failing: bool,
}

impl FakeEnricher {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn summarize_count(&self) -> usize {
        self.summarize_calls.load(Ordering::SeqCst)
    }

    pub fn elaborate_count(&self) -> usize {
        self.elaborate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Enricher for FakeEnricher {
    async fn summarize(&self, title: &str, _body: &str) -> Option<Summary> {
        self.summarize_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return None;
        }
        Some(Summary {
            title_translated: format!("번역: {title}"),
            summary_translated: "요약된 내용".to_string(),
            keywords: vec!["rust".to_string()],
            tokens_used: 10,
        })
    }

    async fn elaborate(&self, title: &str, _body: &str) -> Option<Digest> {
        self.elaborate_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return None;
        }
        Some(Digest {
            detailed_digest: format!("## {title}\n\n상세 요약"),
            tokens_used: 42,
        })
    }
}

/// Source returning a fixed list of drafts.
pub struct StaticSource {
    pub name: String,
    pub platform: Platform,
    pub drafts: Vec<NewArticle>,
}

impl StaticSource {
    pub fn new(name: &str, platform: Platform, drafts: Vec<NewArticle>) -> Arc<dyn Source> {
        Arc::new(Self {
            name: name.to_string(),
            platform,
            drafts,
        })
    }
}

#[async_trait]
impl Source for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch(&self) -> devdigest::Result<Vec<NewArticle>> {
        Ok(self.drafts.clone())
    }
}

/// Source whose fetch always fails.
pub struct FailingSource {
    pub platform: Platform,
}

#[async_trait]
impl Source for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch(&self) -> devdigest::Result<Vec<NewArticle>> {
        Err(DigestError::Feed("connection refused".to_string()))
    }
}

/// Application under test.
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<ArticleRepository>,
    pub enricher: Arc<FakeEnricher>,
}

/// Build a blog draft published `age_days` ago.
pub fn blog_draft(url: &str, title: &str, platform: Platform, age_days: i64) -> NewArticle {
    NewArticle::new(url, title, platform, ContentType::Blog)
        .with_body(format!("Body of {title}"))
        .with_published_at(Utc::now() - Duration::days(age_days))
}

/// Create a production-mode app with the given sources.
pub async fn create_test_app(sources: Vec<Arc<dyn Source>>) -> TestApp {
    create_test_app_with(
        sources,
        RuntimeConfig {
            mode: MODE_PRODUCTION.to_string(),
            cron_secret: TEST_CRON_SECRET.to_string(),
        },
        FakeEnricher::default(),
    )
    .await
}

/// Create a development-mode app with the given sources.
pub async fn create_dev_app(sources: Vec<Arc<dyn Source>>) -> TestApp {
    create_test_app_with(
        sources,
        RuntimeConfig {
            mode: MODE_DEVELOPMENT.to_string(),
            cron_secret: String::new(),
        },
        FakeEnricher::default(),
    )
    .await
}

/// Create an app with explicit runtime settings and enricher.
pub async fn create_test_app_with(
    sources: Vec<Arc<dyn Source>>,
    runtime: RuntimeConfig,
    enricher: FakeEnricher,
) -> TestApp {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let store = Arc::new(ArticleRepository::new(db.pool()));
    let enricher = Arc::new(enricher);

    let pipeline = Arc::new(IngestPipeline::new(
        store.clone(),
        enricher.clone(),
        sources,
        3,
        Arc::new(Unpaced),
    ));
    let app_state = Arc::new(AppState::new(
        store.clone(),
        enricher.clone(),
        pipeline,
        runtime,
    ));

    let server = TestServer::new(create_app(app_state, &[])).expect("Failed to create test server");

    TestApp {
        server,
        store,
        enricher,
    }
}

/// Insert drafts directly into the store.
pub async fn seed(store: &ArticleRepository, drafts: &[NewArticle]) {
    for draft in drafts {
        assert!(store.insert_one(draft).await.expect("Failed to seed article"));
    }
}
