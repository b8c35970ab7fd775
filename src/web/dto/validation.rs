//! Validating extractors for web API DTOs.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::web::error::ApiError;

/// A query-string extractor that validates the parsed value.
///
/// Both parse failures and validation failures are reported as 400 with the
/// standard error body.
///
/// # Example
///
/// ```ignore
/// use devdigest::web::dto::ValidatedQuery;
///
/// async fn list(ValidatedQuery(params): ValidatedQuery<ListArticlesQuery>) { /* ... */ }
/// ```
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid query: {}", e.body_text())))?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedQuery(value))
    }
}
