//! Article module for DevDigest.
//!
//! This module provides the article data model, identity hashing and
//! persistence.

pub mod identity;
pub mod repository;
pub mod types;

pub use identity::article_id;
pub use repository::{ArticlePage, ArticleRepository, ArticleStore, InsertSummary};
pub use types::{
    total_pages, Article, ArticleQuery, ContentType, NewArticle, Platform, DEFAULT_DAYS,
    DEFAULT_PAGE_SIZE, MAX_KEYWORDS, MAX_PAGE_SIZE,
};
