//! Ingestion module for DevDigest.
//!
//! Sources produce article drafts; the pipeline filters out known articles,
//! enriches the rest and stores them.

pub mod feed;
pub mod pacer;
pub mod pipeline;
pub mod scheduler;
pub mod video;

use std::sync::Arc;

use async_trait::async_trait;

use crate::article::{NewArticle, Platform};
use crate::config::Config;
use crate::enrich::Enricher;
use crate::Result;

pub use feed::{parse_entries, validate_url, FeedFetcher, FeedSource};
pub use pacer::{pacer_from_millis, Pacer, RatePacer, Unpaced};
pub use pipeline::{IngestPipeline, IngestReport};
pub use scheduler::{IngestScheduler, DEFAULT_INTERVAL_SECS};
pub use video::{ChannelSource, VideoSummary, YouTubeClient};

/// A configured feed endpoint or video channel.
#[async_trait]
pub trait Source: Send + Sync {
    /// Identifier used in logs.
    fn name(&self) -> &str;

    /// Platform every draft from this source is tagged with.
    fn platform(&self) -> Platform;

    /// Fetch the current drafts.
    async fn fetch(&self) -> Result<Vec<NewArticle>>;
}

/// Build every configured source.
pub fn sources_from_config(
    config: &Config,
    enricher: Arc<dyn Enricher>,
) -> Result<Vec<Arc<dyn Source>>> {
    let mut sources: Vec<Arc<dyn Source>> = Vec::new();

    let fetcher = Arc::new(FeedFetcher::new(&config.feeds)?);
    for feed in &config.sources.feeds {
        sources.push(Arc::new(FeedSource::new(
            feed,
            fetcher.clone(),
            config.ingest.max_body_length,
        )));
    }

    let youtube = Arc::new(YouTubeClient::new(&config.youtube)?);
    let video_enricher = config.youtube.enrich_on_convert.then_some(enricher);
    let video_pacer = pacer_from_millis(config.youtube.pause_ms);
    for channel in &config.sources.channels {
        sources.push(Arc::new(ChannelSource::new(
            channel,
            config.youtube.max_results,
            youtube.clone(),
            video_enricher.clone(),
            video_pacer.clone(),
        )));
    }

    Ok(sources)
}
