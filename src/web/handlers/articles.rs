//! Article handlers for the web API.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::article::Article;
use crate::web::dto::{
    ApiResponse, ArticleListResponse, DeleteAllResponse, DigestResponse, ListArticlesQuery,
    ValidatedQuery,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /api/articles - List articles, newest first.
pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(params): ValidatedQuery<ListArticlesQuery>,
) -> Result<Json<ArticleListResponse>, ApiError> {
    let query = params.into_query()?;

    let page = state.store.list(&query).await.map_err(|e| {
        tracing::error!("Failed to list articles: {}", e);
        ApiError::internal("Failed to list articles")
    })?;

    tracing::debug!(
        platform = ?query.platform,
        days = query.days,
        page = query.page,
        total = page.total,
        "Listed articles"
    );

    Ok(Json(ArticleListResponse::new(page, query.page, query.limit)))
}

/// GET /api/articles/:id - Get one article.
pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Article>>, ApiError> {
    let article = find_article(&state, &id).await?;
    Ok(Json(ApiResponse::new(article)))
}

/// POST /api/articles/:id/summarize - Return the detailed digest, generating
/// it on first request.
pub async fn summarize_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DigestResponse>>, ApiError> {
    let article = find_article(&state, &id).await?;

    if let Some(content_summary) = article.detailed_digest {
        tracing::debug!(id = %article.id, "Returning stored digest");
        return Ok(Json(ApiResponse::new(DigestResponse {
            content_summary,
            tokens: 0,
            cached: true,
        })));
    }

    let digest = state
        .enricher
        .elaborate(&article.title, &article.body)
        .await
        .ok_or_else(|| ApiError::internal("Failed to generate summary"))?;

    match state
        .store
        .set_content_summary(&article.id, &digest.detailed_digest)
        .await
    {
        Ok(true) => {}
        Ok(false) => {
            // Another request stored a digest first; serve that one.
            if let Ok(Some(stored)) = state.store.get_by_id(&article.id).await {
                if let Some(content_summary) = stored.detailed_digest {
                    return Ok(Json(ApiResponse::new(DigestResponse {
                        content_summary,
                        tokens: 0,
                        cached: true,
                    })));
                }
            }
        }
        Err(e) => {
            tracing::warn!(id = %article.id, error = %e, "Failed to store digest");
        }
    }

    Ok(Json(ApiResponse::new(DigestResponse {
        content_summary: digest.detailed_digest,
        tokens: digest.tokens_used,
        cached: false,
    })))
}

/// DELETE /api/articles/delete-all - Wipe all articles (development only).
pub async fn delete_all_articles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DeleteAllResponse>, ApiError> {
    if !state.runtime.is_development() {
        return Err(ApiError::forbidden(
            "This endpoint is only available in development mode",
        ));
    }

    let count = state.store.delete_all().await.map_err(|e| {
        tracing::error!("Failed to delete articles: {}", e);
        ApiError::internal("Failed to delete articles")
    })?;
    tracing::info!(count, "Deleted all articles");

    Ok(Json(DeleteAllResponse {
        success: true,
        message: "All articles deleted successfully".to_string(),
        count,
    }))
}

async fn find_article(state: &AppState, id: &str) -> Result<Article, ApiError> {
    state
        .store
        .get_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get article {}: {}", id, e);
            ApiError::internal("Failed to get article")
        })?
        .ok_or_else(|| ApiError::not_found("Article not found"))
}
