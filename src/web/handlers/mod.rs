//! API handlers for the DevDigest web API.

pub mod articles;
pub mod ingest;

use std::sync::Arc;

use crate::article::ArticleStore;
use crate::config::RuntimeConfig;
use crate::enrich::Enricher;
use crate::ingest::IngestPipeline;

pub use articles::*;
pub use ingest::*;

/// Shared state of all handlers.
pub struct AppState {
    pub store: Arc<dyn ArticleStore>,
    pub enricher: Arc<dyn Enricher>,
    pub pipeline: Arc<IngestPipeline>,
    pub runtime: RuntimeConfig,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        enricher: Arc<dyn Enricher>,
        pipeline: Arc<IngestPipeline>,
        runtime: RuntimeConfig,
    ) -> Self {
        Self {
            store,
            enricher,
            pipeline,
            runtime,
        }
    }
}
