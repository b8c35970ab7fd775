//! Request DTOs for the web API.

use serde::Deserialize;
use validator::Validate;

use crate::article::{ArticleQuery, ContentType, Platform, DEFAULT_DAYS, DEFAULT_PAGE_SIZE};
use crate::web::error::ApiError;

/// Query parameters of `GET /api/articles`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListArticlesQuery {
    /// Platform filter. Empty means all platforms.
    pub platform: Option<String>,
    /// Look-back window in days.
    #[validate(range(min = 1, message = "days must be a positive number"))]
    pub days: Option<i64>,
    /// Content type filter. Empty means all types.
    pub content_type: Option<String>,
    /// 1-based page number.
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u32>,
    /// Page size.
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: Option<u32>,
}

impl ListArticlesQuery {
    /// Resolve defaults and parse the enum filters.
    pub fn into_query(self) -> Result<ArticleQuery, ApiError> {
        Ok(ArticleQuery {
            platform: parse_optional::<Platform>(self.platform)?,
            content_type: parse_optional::<ContentType>(self.content_type)?,
            days: self.days.unwrap_or(DEFAULT_DAYS),
            page: self.page.unwrap_or(1),
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        })
    }
}

/// Body of `POST /api/rss/fetch`.
#[derive(Debug, Default, Deserialize)]
pub struct FetchRequest {
    pub platform: Option<String>,
}

impl FetchRequest {
    /// Parse a raw request body. Anything that isn't a JSON object with an
    /// optional `platform` string falls back to the default request.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Requested platform, defaulting to android.
    pub fn platform(&self) -> Result<Platform, ApiError> {
        Ok(parse_optional::<Platform>(self.platform.clone())?.unwrap_or_default())
    }
}

fn parse_optional<T>(value: Option<String>) -> Result<Option<T>, ApiError>
where
    T: std::str::FromStr<Err = crate::DigestError>,
{
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(ApiError::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::error::ErrorCode;

    #[test]
    fn test_list_query_defaults() {
        let query = ListArticlesQuery::default().into_query().unwrap();
        assert_eq!(query, ArticleQuery::default());
    }

    #[test]
    fn test_list_query_filters() {
        let query = ListArticlesQuery {
            platform: Some("ios".to_string()),
            content_type: Some("video".to_string()),
            days: Some(30),
            page: Some(2),
            limit: Some(50),
        }
        .into_query()
        .unwrap();

        assert_eq!(query.platform, Some(Platform::Ios));
        assert_eq!(query.content_type, Some(ContentType::Video));
        assert_eq!(query.days, 30);
        assert_eq!(query.page, 2);
        assert_eq!(query.limit, 50);
    }

    #[test]
    fn test_list_query_empty_platform_means_all() {
        let query = ListArticlesQuery {
            platform: Some(String::new()),
            ..Default::default()
        }
        .into_query()
        .unwrap();
        assert!(query.platform.is_none());
    }

    #[test]
    fn test_list_query_invalid_enum() {
        let err = ListArticlesQuery {
            content_type: Some("podcast".to_string()),
            ..Default::default()
        }
        .into_query()
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::BadRequest);
    }

    #[test]
    fn test_list_query_ranges() {
        let invalid = [
            ListArticlesQuery {
                page: Some(0),
                ..Default::default()
            },
            ListArticlesQuery {
                limit: Some(101),
                ..Default::default()
            },
            ListArticlesQuery {
                limit: Some(0),
                ..Default::default()
            },
            ListArticlesQuery {
                days: Some(0),
                ..Default::default()
            },
        ];
        for query in invalid {
            assert!(query.validate().is_err(), "{query:?}");
        }

        let valid = ListArticlesQuery {
            page: Some(1),
            limit: Some(100),
            days: Some(1),
            ..Default::default()
        };
        assert!(valid.validate().is_ok());
    }

    #[test]
    fn test_fetch_request_from_body() {
        assert_eq!(FetchRequest::from_body(b"").platform().unwrap(), Platform::Android);
        assert_eq!(
            FetchRequest::from_body(b"not json").platform().unwrap(),
            Platform::Android
        );
        assert_eq!(FetchRequest::from_body(b"{}").platform().unwrap(), Platform::Android);
        assert_eq!(
            FetchRequest::from_body(br#"{"platform":"web"}"#).platform().unwrap(),
            Platform::Web
        );
        assert!(FetchRequest::from_body(br#"{"platform":"windows"}"#)
            .platform()
            .is_err());
    }
}
