//! Date/time utilities for DevDigest.
//!
//! Timestamps are stored as RFC3339 UTC strings with millisecond precision,
//! so lexical order in the database matches chronological order.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Format a UTC datetime for storage.
pub fn to_db_string(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored datetime string.
///
/// Accepts RFC3339 and the plain `YYYY-MM-DD HH:MM:SS` form, which is what
/// hand-inserted rows and SQL defaults tend to produce.
pub fn parse_db_string(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    None
}

/// Parse a timestamp supplied by an external API, falling back to `now`.
pub fn parse_or_now(s: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    parse_db_string(s.trim()).unwrap_or(now)
}
