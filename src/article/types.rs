//! Article types for DevDigest.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::article_id;
use crate::{DigestError, Result};

/// Maximum number of keywords kept on an article.
pub const MAX_KEYWORDS: usize = 5;

/// Default number of days the article list looks back.
pub const DEFAULT_DAYS: i64 = 7;

/// Default page size for the article list.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Target audience of an article, fixed per configured source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Android,
    Ios,
    Web,
    Backend,
}

impl Platform {
    /// All platforms, in display order.
    pub const ALL: [Platform; 4] = [
        Platform::Android,
        Platform::Ios,
        Platform::Web,
        Platform::Backend,
    ];

    /// Database / wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Web => "web",
            Platform::Backend => "backend",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            "web" => Ok(Platform::Web),
            "backend" => Ok(Platform::Backend),
            other => Err(DigestError::Validation(format!(
                "invalid platform '{other}', must be one of: android, ios, web, backend"
            ))),
        }
    }
}

/// Kind of content, fixed per source adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Blog,
    Video,
}

impl ContentType {
    /// Database / wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Blog => "blog",
            ContentType::Video => "video",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "blog" => Ok(ContentType::Blog),
            "video" => Ok(ContentType::Video),
            other => Err(DigestError::Validation(format!(
                "invalid content type '{other}', must be one of: blog, video"
            ))),
        }
    }
}

/// A stored article.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    /// Content hash of the source URL.
    pub id: String,
    /// Original-language title.
    pub title: String,
    /// Translated title.
    #[serde(rename = "title_ko")]
    pub title_translated: Option<String>,
    /// Plain-text excerpt (may be empty).
    #[serde(rename = "description")]
    pub body: String,
    /// Translated summary.
    #[serde(rename = "summary_ko")]
    pub summary_translated: Option<String>,
    /// Short technical terms.
    pub keywords: Option<Vec<String>>,
    /// Long-form digest, generated on first request.
    #[serde(rename = "content_summary")]
    pub detailed_digest: Option<String>,
    /// Canonical origin URL.
    pub source_url: String,
    /// Publish time declared by the source.
    pub published_at: DateTime<Utc>,
    /// Target platform.
    pub platform: Platform,
    /// Blog post or video.
    pub content_type: ContentType,
    /// Ingestion time.
    pub created_at: DateTime<Utc>,
}

/// Draft article produced by a source adapter, before persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub id: String,
    pub title: String,
    pub title_translated: Option<String>,
    pub body: String,
    pub summary_translated: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub source_url: String,
    pub published_at: DateTime<Utc>,
    pub platform: Platform,
    pub content_type: ContentType,
}

impl NewArticle {
    /// Create an unenriched draft. The id is derived from the source URL.
    pub fn new(
        source_url: impl Into<String>,
        title: impl Into<String>,
        platform: Platform,
        content_type: ContentType,
    ) -> Self {
        let source_url = source_url.into();
        Self {
            id: article_id(&source_url),
            title: title.into().trim().to_string(),
            title_translated: None,
            body: String::new(),
            summary_translated: None,
            keywords: None,
            source_url,
            published_at: Utc::now(),
            platform,
            content_type,
        }
    }

    /// Set the plain-text body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the publish time.
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = published_at;
        self
    }

    /// Fill the translated fields from an enrichment result.
    pub fn apply_summary(&mut self, summary: crate::enrich::Summary) {
        self.title_translated = Some(summary.title_translated);
        self.summary_translated = Some(summary.summary_translated);
        self.keywords = Some(summary.keywords);
    }

    /// Whether enrichment has already filled this draft.
    pub fn is_enriched(&self) -> bool {
        self.title_translated.is_some() || self.summary_translated.is_some()
    }
}

/// Filters and paging for the article list.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleQuery {
    pub platform: Option<Platform>,
    pub content_type: Option<ContentType>,
    /// Only articles published within this many days.
    pub days: i64,
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

impl Default for ArticleQuery {
    fn default() -> Self {
        Self {
            platform: None,
            content_type: None,
            days: DEFAULT_DAYS,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ArticleQuery {
    /// Row offset of the requested page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Oldest publish time included by the `days` window.
    ///
    /// A window reaching past the representable range has no lower bound.
    pub fn published_since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        chrono::Duration::try_days(self.days)
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Number of pages needed to show `total` items, `limit` per page.
pub fn total_pages(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_round_trip() {
        for platform in Platform::ALL {
            assert_eq!(platform.as_str().parse::<Platform>().unwrap(), platform);
        }
        assert!("windows".parse::<Platform>().is_err());
        assert!("Android".parse::<Platform>().is_err());
    }

    #[test]
    fn test_content_type_parse() {
        assert_eq!("blog".parse::<ContentType>().unwrap(), ContentType::Blog);
        assert_eq!("video".parse::<ContentType>().unwrap(), ContentType::Video);
        assert!("podcast".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_new_article_is_unenriched_draft() {
        let draft = NewArticle::new("https://x/y", "  Foo  ", Platform::Android, ContentType::Blog);
        assert_eq!(draft.id, article_id("https://x/y"));
        assert_eq!(draft.title, "Foo");
        assert_eq!(draft.body, "");
        assert!(draft.title_translated.is_none());
        assert!(draft.summary_translated.is_none());
        assert!(draft.keywords.is_none());
        assert!(!draft.is_enriched());
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(25, 12), 3);
        assert_eq!(total_pages(24, 12), 2);
        assert_eq!(total_pages(0, 12), 0);
        assert_eq!(total_pages(1, 100), 1);
    }

    #[test]
    fn test_published_since() {
        let now = Utc::now();
        let query = ArticleQuery::default();
        assert_eq!(query.published_since(now), now - chrono::Duration::days(DEFAULT_DAYS));

        let huge = ArticleQuery {
            days: 1_000_000_000,
            ..Default::default()
        };
        assert_eq!(huge.published_since(now), DateTime::<Utc>::MIN_UTC);

        let max = ArticleQuery {
            days: i64::MAX,
            ..Default::default()
        };
        assert_eq!(max.published_since(now), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_query_offset() {
        let query = ArticleQuery {
            page: 3,
            limit: 12,
            ..Default::default()
        };
        assert_eq!(query.offset(), 24);
        assert_eq!(ArticleQuery::default().offset(), 0);
    }

    #[test]
    fn test_article_serializes_with_store_names() {
        let now = Utc::now();
        let article = Article {
            id: "abc".to_string(),
            title: "Foo".to_string(),
            title_translated: Some("푸".to_string()),
            body: String::new(),
            summary_translated: None,
            keywords: Some(vec!["Kotlin".to_string()]),
            detailed_digest: None,
            source_url: "https://x/y".to_string(),
            published_at: now,
            platform: Platform::Ios,
            content_type: ContentType::Video,
            created_at: now,
        };
        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["title_ko"], "푸");
        assert_eq!(json["description"], "");
        assert!(json["summary_ko"].is_null());
        assert!(json["content_summary"].is_null());
        assert_eq!(json["platform"], "ios");
        assert_eq!(json["content_type"], "video");
    }
}
