//! RSS/Atom feed source.
//!
//! This module fetches provider feeds with resource limits and converts
//! their entries into article drafts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feed_rs::parser;
use reqwest::Client;
use tracing::{debug, info, warn};

use super::Source;
use crate::article::{ContentType, NewArticle, Platform};
use crate::config::{FeedSourceConfig, FeedsConfig};
use crate::{DigestError, Result};

/// User agent string for feed fetching.
const USER_AGENT: &str = concat!("DevDigest/", env!("CARGO_PKG_VERSION"), " (feed reader)");

/// HTTP fetcher shared by all feed sources.
pub struct FeedFetcher {
    client: Client,
    max_feed_size: u64,
}

impl FeedFetcher {
    /// Create a fetcher with the configured timeouts and limits.
    pub fn new(config: &FeedsConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DigestError::Feed(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_feed_size: config.max_feed_size_bytes,
        })
    }

    /// Download a feed document, enforcing the size limit.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        validate_url(url)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DigestError::Feed(format!("failed to fetch feed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DigestError::Feed(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_feed_size {
                return Err(DigestError::Feed(format!(
                    "feed too large: {} bytes (max {} bytes)",
                    content_length, self.max_feed_size
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DigestError::Feed(format!("failed to read response: {}", e)))?;

        if bytes.len() as u64 > self.max_feed_size {
            return Err(DigestError::Feed(format!(
                "feed too large: {} bytes (max {} bytes)",
                bytes.len(),
                self.max_feed_size
            )));
        }

        Ok(bytes.to_vec())
    }
}

/// Check that a feed URL is absolute http(s).
pub fn validate_url(url: &str) -> Result<()> {
    let parsed =
        url::Url::parse(url).map_err(|e| DigestError::Feed(format!("invalid URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(DigestError::Feed(format!(
                "unsupported URL scheme: {}",
                scheme
            )));
        }
    }

    if parsed.host().is_none() {
        return Err(DigestError::Feed("URL has no host".to_string()));
    }

    Ok(())
}

/// One configured feed endpoint.
pub struct FeedSource {
    url: String,
    platform: Platform,
    content_type: ContentType,
    max_body_length: usize,
    fetcher: Arc<FeedFetcher>,
}

impl FeedSource {
    pub fn new(config: &FeedSourceConfig, fetcher: Arc<FeedFetcher>, max_body_length: usize) -> Self {
        Self {
            url: config.url.clone(),
            platform: config.platform,
            content_type: config.content_type,
            max_body_length,
            fetcher,
        }
    }
}

#[async_trait]
impl Source for FeedSource {
    fn name(&self) -> &str {
        &self.url
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch(&self) -> Result<Vec<NewArticle>> {
        debug!(url = %self.url, "Fetching feed");
        let bytes = self.fetcher.fetch(&self.url).await?;
        let drafts = parse_entries(
            &bytes,
            self.platform,
            self.content_type,
            self.max_body_length,
            Utc::now(),
        )?;
        info!(url = %self.url, count = drafts.len(), "Converted feed entries");
        Ok(drafts)
    }
}

/// Parse feed bytes into drafts.
///
/// Entries without a link or a non-blank title are skipped. Entries without
/// a usable date are stamped with `now`.
pub fn parse_entries(
    bytes: &[u8],
    platform: Platform,
    content_type: ContentType,
    max_body_length: usize,
    now: DateTime<Utc>,
) -> Result<Vec<NewArticle>> {
    let feed = parser::parse(bytes)
        .map_err(|e| DigestError::Feed(format!("failed to parse feed: {}", e)))?;

    let mut drafts = Vec::with_capacity(feed.entries.len());
    for entry in feed.entries {
        let title = entry
            .title
            .map(|t| strip_html(&t.content))
            .filter(|t| !t.is_empty());
        let link = entry
            .links
            .iter()
            .find(|l| l.rel.as_deref().map_or(true, |rel| rel == "alternate"))
            .or(entry.links.first())
            .map(|l| l.href.trim().to_string())
            .filter(|l| !l.is_empty());

        let (Some(title), Some(link)) = (title, link) else {
            warn!(entry_id = %entry.id, "Skipping feed entry without title or link");
            continue;
        };

        let body = entry
            .summary
            .map(|t| t.content)
            .or(entry.content.and_then(|c| c.body))
            .map(|d| truncate_chars(&strip_html(&d), max_body_length))
            .unwrap_or_default();
        let published_at = entry.published.or(entry.updated).unwrap_or(now);

        drafts.push(
            NewArticle::new(link, title, platform, content_type)
                .with_body(body)
                .with_published_at(published_at),
        );
    }

    Ok(drafts)
}

/// Strip HTML tags from text and decode entities.
pub(crate) fn strip_html(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    let mut in_entity = false;
    let mut entity = String::new();

    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            '&' if !in_tag => {
                in_entity = true;
                entity.clear();
            }
            ';' if in_entity => {
                in_entity = false;
                match entity.as_str() {
                    "amp" => result.push('&'),
                    "lt" => result.push('<'),
                    "gt" => result.push('>'),
                    "quot" => result.push('"'),
                    "apos" => result.push('\''),
                    "nbsp" => result.push(' '),
                    _ if entity.starts_with('#') => {
                        if let Some(c) = parse_numeric_entity(&entity).and_then(char::from_u32) {
                            result.push(c);
                        }
                    }
                    _ => {
                        result.push('&');
                        result.push_str(&entity);
                        result.push(';');
                    }
                }
            }
            // A bare '&' followed by a space never becomes an entity.
            ' ' if in_entity => {
                in_entity = false;
                result.push('&');
                result.push_str(&entity);
                result.push(' ');
            }
            _ if in_entity => entity.push(ch),
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    if in_entity {
        result.push('&');
        result.push_str(&entity);
    }

    result.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Parse a numeric HTML entity (e.g., "#123" or "#x7B").
fn parse_numeric_entity(entity: &str) -> Option<u32> {
    if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        u32::from_str_radix(hex, 16).ok()
    } else {
        entity.strip_prefix('#')?.parse().ok()
    }
}

/// Truncate text to at most `max_chars` characters.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
