//! Router configuration for the web API.

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    cron_fetch, delete_all_articles, fetch_rss, get_article, list_articles, summarize_article,
    AppState,
};
use super::middleware::create_cors_layer;

/// Create the main API router, mounted under `/api`.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let article_routes = Router::new()
        .route("/", get(list_articles))
        .route("/delete-all", delete(delete_all_articles))
        .route("/:id", get(get_article))
        .route("/:id/summarize", post(summarize_article));

    let api_routes = Router::new()
        .nest("/articles", article_routes)
        .route("/rss/fetch", post(fetch_rss))
        .route("/cron/fetch", get(cron_fetch));

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Create the full application: API plus health check.
pub fn create_app(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    create_router(app_state, cors_origins).merge(create_health_router())
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
