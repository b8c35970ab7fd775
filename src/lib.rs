//! DevDigest - curated developer news
//!
//! Collects articles from RSS/Atom feeds and YouTube channels, enriches them
//! with machine-translated summaries and serves them over a JSON API.

pub mod article;
pub mod config;
pub mod datetime;
pub mod db;
pub mod enrich;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod web;

pub use article::{
    article_id, Article, ArticlePage, ArticleQuery, ArticleRepository, ArticleStore, ContentType,
    NewArticle, Platform,
};
pub use config::Config;
pub use db::Database;
pub use enrich::{Digest, Enricher, OpenAiEnricher, Summary};
pub use error::{DigestError, Result};
pub use ingest::{IngestPipeline, IngestReport, IngestScheduler, Source};
pub use web::{create_app, WebServer};
