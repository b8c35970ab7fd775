//! Typed decoding of model replies.

use serde::Deserialize;
use thiserror::Error;

use super::Summary;
use crate::article::MAX_KEYWORDS;

/// Why a model reply was rejected.
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("empty reply")]
    Empty,

    #[error("reply does not match the summary schema: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("reply field '{0}' is blank")]
    BlankField(&'static str),
}

/// Labels the model sometimes prefixes to a translated title.
pub const TITLE_LABELS: &[&str] = &["제목", "title"];

/// Labels the model sometimes prefixes to a summary.
pub const SUMMARY_LABELS: &[&str] = &["요약", "summary"];

#[derive(Debug, Deserialize)]
struct SummaryReply {
    title_ko: String,
    summary_ko: String,
    #[serde(default)]
    keywords: Vec<String>,
}

/// Decode a JSON summary reply.
///
/// Label prefixes are stripped, blank keywords dropped and the list capped
/// at five. `tokens_used` is left at zero for the caller to fill in.
pub fn decode_summary(raw: &str) -> Result<Summary, ReplyError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ReplyError::Empty);
    }

    let reply: SummaryReply = serde_json::from_str(raw)?;

    let title_translated = strip_label(&reply.title_ko, TITLE_LABELS);
    if title_translated.is_empty() {
        return Err(ReplyError::BlankField("title_ko"));
    }
    let summary_translated = strip_label(&reply.summary_ko, SUMMARY_LABELS);
    if summary_translated.is_empty() {
        return Err(ReplyError::BlankField("summary_ko"));
    }

    let keywords = reply
        .keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .take(MAX_KEYWORDS)
        .collect();

    Ok(Summary {
        title_translated,
        summary_translated,
        keywords,
        tokens_used: 0,
    })
}

/// Remove one leading `<label>:` prefix (case-insensitive) and trim.
pub fn strip_label(text: &str, labels: &[&str]) -> String {
    let text = text.trim();
    for label in labels {
        let Some(head) = text.get(..label.len()) else {
            continue;
        };
        if !head.to_lowercase().eq(&label.to_lowercase()) {
            continue;
        }
        if let Some(rest) = text[label.len()..].strip_prefix(':') {
            return rest.trim().to_string();
        }
    }
    text.to_string()
}
