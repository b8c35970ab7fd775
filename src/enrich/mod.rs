//! Language-model enrichment for DevDigest.
//!
//! Enrichment translates and summarizes articles and produces long-form
//! digests on request. Every failure resolves to `None`; callers keep the
//! article without the enriched fields.

pub mod client;
pub mod reply;

use async_trait::async_trait;

pub use client::OpenAiEnricher;
pub use reply::{decode_summary, strip_label, ReplyError};

/// Translated title, summary and keywords for one article.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub title_translated: String,
    pub summary_translated: String,
    /// At most five non-empty entries.
    pub keywords: Vec<String>,
    pub tokens_used: u32,
}

/// Long-form Markdown digest for one article.
#[derive(Debug, Clone, PartialEq)]
pub struct Digest {
    pub detailed_digest: String,
    pub tokens_used: u32,
}

/// Language-model operations used by ingestion and the digest endpoint.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Translate the title and summarize the body.
    async fn summarize(&self, title: &str, body: &str) -> Option<Summary>;

    /// Produce a detailed digest of the article.
    async fn elaborate(&self, title: &str, body: &str) -> Option<Digest>;
}
