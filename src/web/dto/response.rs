//! Response DTOs for the web API.

use serde::Serialize;

use crate::article::{total_pages, Article, ArticlePage};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response.
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Paginated article list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleListResponse {
    pub success: bool,
    pub data: Vec<Article>,
    /// Items on this page.
    pub count: usize,
    /// Items matching the filters.
    pub total: u64,
    pub page: u32,
    pub total_pages: u64,
}

impl ArticleListResponse {
    pub fn new(page: ArticlePage, page_number: u32, limit: u32) -> Self {
        Self {
            success: true,
            count: page.articles.len(),
            total_pages: total_pages(page.total, limit),
            total: page.total,
            page: page_number,
            data: page.articles,
        }
    }
}

/// Detailed digest of one article.
#[derive(Debug, Serialize)]
pub struct DigestResponse {
    pub content_summary: String,
    /// Tokens spent producing it; zero when served from storage.
    pub tokens: u32,
    pub cached: bool,
}

/// Result of a manual ingestion run.
#[derive(Debug, Serialize)]
pub struct FetchResponse {
    pub success: bool,
    pub count: usize,
    pub message: String,
}

/// Result of wiping all articles.
#[derive(Debug, Serialize)]
pub struct DeleteAllResponse {
    pub success: bool,
    pub message: String,
    pub count: u64,
}

/// Result of a scheduled ingestion trigger.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CronResponse {
    pub success: bool,
    pub count: usize,
    /// Run duration in milliseconds.
    pub elapsed_time: u64,
    /// RFC 3339 completion time.
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
