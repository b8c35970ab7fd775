//! Ingestion trigger handlers for the web API.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use chrono::Utc;

use crate::datetime::to_db_string;
use crate::web::dto::{CronResponse, FetchRequest, FetchResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// POST /api/rss/fetch - Run ingestion for one platform.
///
/// The body is optional; `{"platform": "..."}` selects the platform,
/// anything unparseable means android.
pub async fn fetch_rss(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<FetchResponse>, ApiError> {
    let platform = FetchRequest::from_body(&body).platform()?;

    let report = state.pipeline.run(platform).await;
    if !report.success {
        return Err(ApiError::internal(report.error.unwrap_or_else(|| {
            "Failed to fetch and store articles".to_string()
        })));
    }

    Ok(Json(FetchResponse {
        success: true,
        count: report.count,
        message: format!(
            "Successfully fetched and stored {} new articles",
            report.count
        ),
    }))
}

/// GET /api/cron/fetch - Scheduled trigger for every configured platform.
///
/// Outside development the request must carry `Authorization: Bearer <secret>`.
pub async fn cron_fetch(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<CronResponse>, ApiError> {
    if !state.runtime.is_development() {
        authorize_cron(&headers, &state.runtime.cron_secret)?;
    }

    tracing::info!("Starting scheduled ingestion");
    let started = Instant::now();
    let reports = state.pipeline.run_all().await;
    let elapsed_time = started.elapsed().as_millis() as u64;

    let count = reports.iter().map(|r| r.count).sum();
    let errors: Vec<String> = reports
        .iter()
        .filter_map(|r| r.error.as_ref().map(|e| format!("{}: {}", r.platform, e)))
        .collect();

    if !errors.is_empty() {
        let message = errors.join("; ");
        tracing::error!(elapsed_time, "Scheduled ingestion failed: {}", message);
        return Err(ApiError::internal(message));
    }

    tracing::info!(count, elapsed_time, "Scheduled ingestion complete");
    Ok(Json(CronResponse {
        success: true,
        count,
        elapsed_time,
        timestamp: to_db_string(&Utc::now()),
        error: None,
    }))
}

/// Check the bearer secret. An unset secret rejects every request.
fn authorize_cron(headers: &HeaderMap, secret: &str) -> Result<(), ApiError> {
    if secret.is_empty() {
        tracing::warn!("Cron trigger rejected: no cron secret configured");
        return Err(ApiError::unauthorized("Unauthorized"));
    }

    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match provided {
        Some(token) if token == secret => Ok(()),
        _ => Err(ApiError::unauthorized("Unauthorized")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_authorize_cron() {
        assert!(authorize_cron(&headers("Bearer s3cret"), "s3cret").is_ok());
        assert!(authorize_cron(&headers("Bearer wrong"), "s3cret").is_err());
        assert!(authorize_cron(&headers("s3cret"), "s3cret").is_err());
        assert!(authorize_cron(&HeaderMap::new(), "s3cret").is_err());
    }

    #[test]
    fn test_authorize_cron_without_secret() {
        assert!(authorize_cron(&headers("Bearer "), "").is_err());
        assert!(authorize_cron(&HeaderMap::new(), "").is_err());
    }
}
