//! YouTube channel source.
//!
//! Recent uploads are listed through the Data API search endpoint and
//! converted into video drafts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use super::feed::strip_html;
use super::pacer::Pacer;
use super::Source;
use crate::article::{ContentType, NewArticle, Platform};
use crate::config::{ChannelSourceConfig, YouTubeConfig};
use crate::datetime::parse_or_now;
use crate::enrich::Enricher;
use crate::{DigestError, Result};

/// Request timeout for the Data API.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// One recent upload.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSummary {
    pub video_id: String,
    pub title: String,
    pub description: String,
    /// Raw `publishedAt` value from the API.
    pub published_at: String,
}

impl VideoSummary {
    /// Canonical watch URL.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    published_at: String,
}

/// YouTube Data API client.
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(config: &YouTubeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| DigestError::Video(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// List the most recent uploads of a channel, newest first.
    ///
    /// Returns an empty list when no API key is configured.
    pub async fn fetch_recent(&self, channel_id: &str, max_items: u32) -> Result<Vec<VideoSummary>> {
        if self.api_key.is_empty() {
            error!(channel_id, "YouTube API key is not configured, skipping channel");
            return Ok(Vec::new());
        }

        let max_results = max_items.to_string();
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("part", "snippet"),
                ("channelId", channel_id),
                ("maxResults", max_results.as_str()),
                ("order", "date"),
                ("type", "video"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DigestError::Video(format!("search request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DigestError::Video(format!("HTTP error {}: {}", status, body)));
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| DigestError::Video(format!("invalid search response: {}", e)))?;

        Ok(videos_from_search(search, channel_id))
    }
}

/// Keep search results that are videos with a non-blank title.
fn videos_from_search(search: SearchResponse, channel_id: &str) -> Vec<VideoSummary> {
    search
        .items
        .into_iter()
        .filter_map(|item| {
            let video_id = item.id.video_id.filter(|id| !id.is_empty())?;
            let title = strip_html(&item.snippet.title);
            if title.is_empty() {
                warn!(channel_id, video_id = %video_id, "Skipping video without title");
                return None;
            }
            Some(VideoSummary {
                video_id,
                title,
                description: strip_html(&item.snippet.description),
                published_at: item.snippet.published_at,
            })
        })
        .collect()
}

/// Convert a video into a draft.
pub fn to_draft(video: &VideoSummary, platform: Platform, now: DateTime<Utc>) -> NewArticle {
    NewArticle::new(video.watch_url(), video.title.clone(), platform, ContentType::Video)
        .with_body(video.description.clone())
        .with_published_at(parse_or_now(&video.published_at, now))
}

/// One configured channel.
pub struct ChannelSource {
    channel_id: String,
    name: String,
    platform: Platform,
    max_results: u32,
    client: Arc<YouTubeClient>,
    /// Set when videos are summarized during conversion.
    enricher: Option<Arc<dyn Enricher>>,
    pacer: Arc<dyn Pacer>,
}

impl ChannelSource {
    pub fn new(
        config: &ChannelSourceConfig,
        max_results: u32,
        client: Arc<YouTubeClient>,
        enricher: Option<Arc<dyn Enricher>>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        let name = if config.name.is_empty() {
            config.channel_id.clone()
        } else {
            config.name.clone()
        };
        Self {
            channel_id: config.channel_id.clone(),
            name,
            platform: config.platform,
            max_results,
            client,
            enricher,
            pacer,
        }
    }
}

#[async_trait]
impl Source for ChannelSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch(&self) -> Result<Vec<NewArticle>> {
        debug!(channel = %self.name, "Fetching recent videos");
        let videos = self
            .client
            .fetch_recent(&self.channel_id, self.max_results)
            .await?;

        let mut drafts = Vec::with_capacity(videos.len());
        for video in &videos {
            let mut draft = to_draft(video, self.platform, Utc::now());
            if let Some(enricher) = &self.enricher {
                self.pacer.ready().await;
                if let Some(summary) = enricher.summarize(&draft.title, &draft.body).await {
                    draft.apply_summary(summary);
                }
            }
            drafts.push(draft);
        }

        info!(channel = %self.name, count = drafts.len(), "Converted channel videos");
        Ok(drafts)
    }
}
