//! OpenAI-compatible chat completion client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::reply::decode_summary;
use super::{Digest, Enricher, Summary};
use crate::config::EnrichmentConfig;
use crate::{DigestError, Result};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: u32,
}

/// Reply text and token usage of one completion.
struct Completion {
    text: String,
    tokens_used: u32,
}

/// Enricher backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiEnricher {
    client: Client,
    config: EnrichmentConfig,
}

impl OpenAiEnricher {
    /// Create a client from configuration.
    pub fn new(config: EnrichmentConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DigestError::Http(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn summary_prompt(&self, title: &str, body: &str) -> (String, String) {
        let language = &self.config.target_language;
        let system = format!(
            "You summarize technical blog posts and videos for {language}-speaking developers. \
             Be concise and precise, and always reply with a single JSON object."
        );
        let user = format!(
            "Article Title: {title}\n\
             Article Content: {body}\n\n\
             Create a JSON response with:\n\
             1. title_ko: natural {language} translation of the title (one line)\n\
             2. summary_ko: 3-5 sentence {language} summary covering the key points and the impact on developers\n\
             3. keywords: array of 3-5 key technical terms\n\n\
             Rules:\n\
             - Respond ONLY with valid JSON, no additional text\n\
             - Do NOT prefix values with labels such as \"Title:\" or \"Summary:\"\n\
             - Keywords may stay in their original language"
        );
        (system, user)
    }

    fn digest_prompt(&self, title: &str, body: &str) -> (String, String) {
        let language = &self.config.target_language;
        let system = format!(
            "You analyze technical content for {language}-speaking developers and write \
             structured, detailed digests they can apply in practice."
        );
        let user = format!(
            "Write a detailed {language} digest of the following technical content.\n\n\
             Title: {title}\n\
             Content: {body}\n\n\
             Include these sections:\n\
             1. **Overview**: the main topic and purpose\n\
             2. **Key points**: features, changes or new concepts as bullet points\n\
             3. **Impact on developers**: how to apply it in practice\n\
             4. **Keywords**: related technologies and concepts\n\n\
             Answer in plain Markdown. Do not wrap the answer in a code block."
        );
        (system, user)
    }

    async fn complete(
        &self,
        system: String,
        user: String,
        max_tokens: u32,
        json_reply: bool,
    ) -> Result<Completion> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.config.temperature,
            max_tokens,
            response_format: json_reply.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::TOO_MANY_REQUESTS || body.contains("rate_limit") {
                warn!(%status, "Language model rate limit exceeded");
                return Err(DigestError::Http(format!("rate limited ({status})")));
            }
            return Err(DigestError::Http(format!("API error {status}: {body}")));
        }

        let reply: ChatResponse = response.json().await?;
        let tokens_used = reply.usage.map(|u| u.total_tokens).unwrap_or(0);
        let text = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|t| t.trim().to_string())
            .unwrap_or_default();

        Ok(Completion { text, tokens_used })
    }

    fn has_key(&self) -> bool {
        if self.config.api_key.is_empty() {
            error!("Language model API key is not configured");
            return false;
        }
        true
    }
}

/// Truncate to at most `max_chars` characters.
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[async_trait]
impl Enricher for OpenAiEnricher {
    async fn summarize(&self, title: &str, body: &str) -> Option<Summary> {
        if !self.has_key() {
            return None;
        }

        let started = Instant::now();
        let body = truncate_chars(body, self.config.max_input_chars);
        let (system, user) = self.summary_prompt(title, body);

        let completion = match self
            .complete(system, user, self.config.summary_max_tokens, true)
            .await
        {
            Ok(c) => c,
            Err(e) => {
                warn!(title, error = %e, "Summary request failed");
                return None;
            }
        };

        match decode_summary(&completion.text) {
            Ok(mut summary) => {
                summary.tokens_used = completion.tokens_used;
                info!(
                    title,
                    tokens = completion.tokens_used,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Summary generated"
                );
                Some(summary)
            }
            Err(e) => {
                warn!(title, error = %e, raw = %completion.text, "Discarding summary reply");
                None
            }
        }
    }

    async fn elaborate(&self, title: &str, body: &str) -> Option<Digest> {
        if !self.has_key() {
            return None;
        }

        let started = Instant::now();
        let body = truncate_chars(body, self.config.max_input_chars);
        let (system, user) = self.digest_prompt(title, body);

        let completion = match self
            .complete(system, user, self.config.digest_max_tokens, false)
            .await
        {
            Ok(c) => c,
            Err(e) => {
                warn!(title, error = %e, "Digest request failed");
                return None;
            }
        };

        if completion.text.is_empty() {
            warn!(title, "Digest reply was empty");
            return None;
        }

        info!(
            title,
            tokens = completion.tokens_used,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Digest generated"
        );
        Some(Digest {
            detailed_digest: completion.text,
            tokens_used: completion.tokens_used,
        })
    }
}
