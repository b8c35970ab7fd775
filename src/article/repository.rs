//! Article persistence for DevDigest.
//!
//! `ArticleStore` is the seam the ingestion pipeline and the web handlers
//! depend on; `ArticleRepository` implements it on top of sqlx.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::QueryBuilder;
use tracing::{debug, info, warn};

use super::types::{Article, ArticleQuery, ContentType, NewArticle, Platform};
use crate::datetime::{parse_db_string, to_db_string};
use crate::db::{DbBackend, DbPool};
use crate::{DigestError, Result};

/// Outcome of a bulk insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertSummary {
    /// Rows actually written.
    pub inserted: usize,
    /// Duplicates and failed rows.
    pub skipped: usize,
}

/// One page of the article list.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticlePage {
    pub articles: Vec<Article>,
    /// Number of rows matching the filters, ignoring paging.
    pub total: u64,
}

/// Storage operations used by ingestion and the API.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Fail if the backing store can't be reached.
    async fn ping(&self) -> Result<()>;

    /// Whether an article with this source URL is already stored.
    ///
    /// Lookup errors are logged and reported as `false`, so the item is
    /// treated as new and the insert's uniqueness check decides.
    async fn exists(&self, source_url: &str) -> bool;

    /// Insert a draft. Returns `Ok(false)` when the id or source URL is
    /// already present.
    async fn insert_one(&self, article: &NewArticle) -> Result<bool>;

    /// Insert drafts one by one. Each item's outcome is independent.
    async fn insert_many(&self, articles: &[NewArticle]) -> InsertSummary {
        let mut summary = InsertSummary::default();
        for article in articles {
            match self.insert_one(article).await {
                Ok(true) => {
                    debug!(title = %article.title, "Article inserted");
                    summary.inserted += 1;
                }
                Ok(false) => {
                    debug!(title = %article.title, "Article already exists");
                    summary.skipped += 1;
                }
                Err(e) => {
                    warn!(title = %article.title, error = %e, "Failed to insert article");
                    summary.skipped += 1;
                }
            }
        }
        info!(
            "Inserted {} articles, skipped {}",
            summary.inserted, summary.skipped
        );
        summary
    }

    /// Get an article by id.
    async fn get_by_id(&self, id: &str) -> Result<Option<Article>>;

    /// List articles newest first.
    async fn list(&self, query: &ArticleQuery) -> Result<ArticlePage>;

    /// Store the detailed digest unless one is already present.
    ///
    /// Returns `true` if this call wrote it.
    async fn set_content_summary(&self, id: &str, digest: &str) -> Result<bool>;

    /// Delete every article. Returns the number of deleted rows.
    async fn delete_all(&self) -> Result<u64>;
}

/// Row type for articles from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ArticleRow {
    id: String,
    title: String,
    title_ko: Option<String>,
    description: String,
    summary_ko: Option<String>,
    keywords: Option<String>,
    content_summary: Option<String>,
    source_url: String,
    published_at: String,
    platform: String,
    content_type: String,
    created_at: String,
}

impl TryFrom<ArticleRow> for Article {
    type Error = DigestError;

    fn try_from(row: ArticleRow) -> Result<Self> {
        let keywords = match row.keywords {
            Some(raw) => Some(serde_json::from_str::<Vec<String>>(&raw).map_err(|e| {
                DigestError::Database(format!("invalid keywords for article {}: {}", row.id, e))
            })?),
            None => None,
        };

        Ok(Article {
            platform: row.platform.parse::<Platform>()?,
            content_type: row.content_type.parse::<ContentType>()?,
            published_at: parse_db_string(&row.published_at).unwrap_or_else(Utc::now),
            created_at: parse_db_string(&row.created_at).unwrap_or_else(Utc::now),
            id: row.id,
            title: row.title,
            title_translated: row.title_ko,
            body: row.description,
            summary_translated: row.summary_ko,
            keywords,
            detailed_digest: row.content_summary,
            source_url: row.source_url,
        })
    }
}

const ARTICLE_COLUMNS: &str = "id, title, title_ko, description, summary_ko, keywords, \
     content_summary, source_url, published_at, platform, content_type, created_at";

/// sqlx-backed article repository.
#[derive(Clone)]
pub struct ArticleRepository {
    pool: DbPool,
}

impl ArticleRepository {
    /// Create a new repository over the given pool.
    pub fn new(pool: &DbPool) -> Self {
        Self { pool: pool.clone() }
    }

    fn push_filters(
        builder: &mut QueryBuilder<'_, DbBackend>,
        query: &ArticleQuery,
        since: DateTime<Utc>,
    ) {
        builder.push(" WHERE published_at >= ");
        builder.push_bind(to_db_string(&since));
        if let Some(platform) = query.platform {
            builder.push(" AND platform = ");
            builder.push_bind(platform.as_str());
        }
        if let Some(content_type) = query.content_type {
            builder.push(" AND content_type = ");
            builder.push_bind(content_type.as_str());
        }
    }
}

#[async_trait]
impl ArticleStore for ArticleRepository {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT id FROM articles LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DigestError::DatabaseConnection(e.to_string()))?;
        Ok(())
    }

    async fn exists(&self, source_url: &str) -> bool {
        let result: std::result::Result<i64, sqlx::Error> =
            sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE source_url = $1")
                .bind(source_url)
                .fetch_one(&self.pool)
                .await;

        match result {
            Ok(count) => count > 0,
            Err(e) => {
                warn!(source_url, error = %e, "Failed to check article existence");
                false
            }
        }
    }

    async fn insert_one(&self, article: &NewArticle) -> Result<bool> {
        let keywords = article
            .keywords
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| DigestError::Database(e.to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO articles (id, title, title_ko, description, summary_ko, keywords,
                                  source_url, published_at, platform, content_type, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&article.id)
        .bind(&article.title)
        .bind(&article.title_translated)
        .bind(&article.body)
        .bind(&article.summary_translated)
        .bind(&keywords)
        .bind(&article.source_url)
        .bind(to_db_string(&article.published_at))
        .bind(article.platform.as_str())
        .bind(article.content_type.as_str())
        .bind(to_db_string(&Utc::now()))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Article>> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Article::try_from).transpose()
    }

    async fn list(&self, query: &ArticleQuery) -> Result<ArticlePage> {
        let since = query.published_since(Utc::now());

        let mut count_query: QueryBuilder<DbBackend> =
            QueryBuilder::new("SELECT COUNT(*) FROM articles");
        Self::push_filters(&mut count_query, query, since);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut select: QueryBuilder<DbBackend> =
            QueryBuilder::new(format!("SELECT {ARTICLE_COLUMNS} FROM articles"));
        Self::push_filters(&mut select, query, since);
        select.push(" ORDER BY published_at DESC, id ASC LIMIT ");
        select.push_bind(i64::from(query.limit));
        select.push(" OFFSET ");
        select.push_bind(query.offset() as i64);

        let rows = select
            .build_query_as::<ArticleRow>()
            .fetch_all(&self.pool)
            .await?;

        let articles = rows
            .into_iter()
            .map(Article::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(ArticlePage {
            articles,
            total: total.max(0) as u64,
        })
    }

    async fn set_content_summary(&self, id: &str, digest: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE articles SET content_summary = $1 WHERE id = $2 AND content_summary IS NULL",
        )
        .bind(digest)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM articles")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
