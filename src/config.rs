//! Configuration module for DevDigest.

use serde::Deserialize;
use std::path::Path;

use crate::article::{ContentType, Platform};
use crate::{DigestError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (`sqlite://...` or `postgres://...`).
    #[serde(default = "default_db_url")]
    pub url: String,
}

fn default_db_url() -> String {
    "sqlite://data/devdigest.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file path.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/devdigest.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Runtime mode name that enables development-only behavior.
pub const MODE_DEVELOPMENT: &str = "development";
/// Runtime mode name for deployed instances.
pub const MODE_PRODUCTION: &str = "production";

/// Runtime configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    /// `development` or `production`.
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Shared secret expected by the cron trigger outside development.
    #[serde(default)]
    pub cron_secret: String,
}

fn default_mode() -> String {
    MODE_PRODUCTION.to_string()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            cron_secret: String::new(),
        }
    }
}

impl RuntimeConfig {
    /// Whether development-only endpoints are enabled.
    pub fn is_development(&self) -> bool {
        self.mode == MODE_DEVELOPMENT
    }
}

/// Language-model enrichment configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
    /// API key. Enrichment is skipped when empty.
    #[serde(default)]
    pub api_key: String,
    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_enrichment_base_url")]
    pub base_url: String,
    /// Model name.
    #[serde(default = "default_enrichment_model")]
    pub model: String,
    /// Sampling temperature.
    #[serde(default = "default_enrichment_temperature")]
    pub temperature: f32,
    /// Max tokens for a summary reply.
    #[serde(default = "default_summary_max_tokens")]
    pub summary_max_tokens: u32,
    /// Max tokens for a detailed digest reply.
    #[serde(default = "default_digest_max_tokens")]
    pub digest_max_tokens: u32,
    /// Body characters included in a prompt.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    /// Request timeout in seconds.
    #[serde(default = "default_enrichment_timeout")]
    pub timeout_secs: u64,
    /// Language the summaries are written in.
    #[serde(default = "default_target_language")]
    pub target_language: String,
}

fn default_enrichment_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_enrichment_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_enrichment_temperature() -> f32 {
    0.7
}

fn default_summary_max_tokens() -> u32 {
    700
}

fn default_digest_max_tokens() -> u32 {
    1500
}

fn default_max_input_chars() -> usize {
    8000
}

fn default_enrichment_timeout() -> u64 {
    60
}

fn default_target_language() -> String {
    "Korean".to_string()
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_enrichment_base_url(),
            model: default_enrichment_model(),
            temperature: default_enrichment_temperature(),
            summary_max_tokens: default_summary_max_tokens(),
            digest_max_tokens: default_digest_max_tokens(),
            max_input_chars: default_max_input_chars(),
            timeout_secs: default_enrichment_timeout(),
            target_language: default_target_language(),
        }
    }
}

/// YouTube Data API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeConfig {
    /// API key. Channels are skipped when empty.
    #[serde(default)]
    pub api_key: String,
    /// Base URL of the Data API.
    #[serde(default = "default_youtube_base_url")]
    pub base_url: String,
    /// Videos requested per channel.
    #[serde(default = "default_youtube_max_results")]
    pub max_results: u32,
    /// Minimum pause between video conversions in milliseconds.
    #[serde(default = "default_youtube_pause_ms")]
    pub pause_ms: u64,
    /// Summarize each video while converting it.
    #[serde(default = "default_enrich_on_convert")]
    pub enrich_on_convert: bool,
}

fn default_youtube_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_youtube_max_results() -> u32 {
    5
}

fn default_youtube_pause_ms() -> u64 {
    500
}

fn default_enrich_on_convert() -> bool {
    true
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_youtube_base_url(),
            max_results: default_youtube_max_results(),
            pause_ms: default_youtube_pause_ms(),
            enrich_on_convert: default_enrich_on_convert(),
        }
    }
}

/// Feed fetching configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedsConfig {
    /// Maximum feed size in bytes.
    #[serde(default = "default_max_feed_size")]
    pub max_feed_size_bytes: u64,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Read timeout in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    /// Maximum number of redirects.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_max_feed_size() -> u64 {
    10 * 1024 * 1024
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_read_timeout() -> u64 {
    30
}

fn default_total_timeout() -> u64 {
    60
}

fn default_max_redirects() -> usize {
    5
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            max_feed_size_bytes: default_max_feed_size(),
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            total_timeout_secs: default_total_timeout(),
            max_redirects: default_max_redirects(),
        }
    }
}

/// Ingestion pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Concurrent enrichment calls per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Minimum pause between batch starts in milliseconds.
    #[serde(default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,
    /// Maximum body length in characters.
    #[serde(default = "default_max_body_length")]
    pub max_body_length: usize,
}

fn default_batch_size() -> usize {
    3
}

fn default_batch_pause_ms() -> u64 {
    1000
}

fn default_max_body_length() -> usize {
    1000
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_pause_ms: default_batch_pause_ms(),
            max_body_length: default_max_body_length(),
        }
    }
}

/// Periodic ingestion configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Whether the in-process scheduler runs.
    #[serde(default)]
    pub enabled: bool,
    /// Interval between runs in seconds.
    #[serde(default = "default_scheduler_interval")]
    pub interval_secs: u64,
}

fn default_scheduler_interval() -> u64 {
    86_400
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_scheduler_interval(),
        }
    }
}

/// One configured RSS/Atom endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedSourceConfig {
    pub url: String,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default = "default_feed_content_type")]
    pub content_type: ContentType,
}

fn default_feed_content_type() -> ContentType {
    ContentType::Blog
}

/// One configured YouTube channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChannelSourceConfig {
    pub channel_id: String,
    /// Display name, used in logs.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub platform: Platform,
}

/// Content sources.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_feeds")]
    pub feeds: Vec<FeedSourceConfig>,
    #[serde(default = "default_channels")]
    pub channels: Vec<ChannelSourceConfig>,
}

fn default_feeds() -> Vec<FeedSourceConfig> {
    [
        "https://android-developers.googleblog.com/feeds/posts/default",
        "https://blog.jetbrains.com/kotlin/feed/",
    ]
    .into_iter()
    .map(|url| FeedSourceConfig {
        url: url.to_string(),
        platform: Platform::Android,
        content_type: ContentType::Blog,
    })
    .collect()
}

fn default_channels() -> Vec<ChannelSourceConfig> {
    [
        ("UCKNTZMRHPLXfqlbdOI7mCkg", "Philipp Lackner"),
        ("UC_Fh8kvtkVPkeihBs42jGcA", "Coding in Flow"),
        ("UCVysWoMPvvezb5fGJY8ADig", "Android Developers"),
    ]
    .into_iter()
    .map(|(channel_id, name)| ChannelSourceConfig {
        channel_id: channel_id.to_string(),
        name: name.to_string(),
        platform: Platform::Android,
    })
    .collect()
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            feeds: default_feeds(),
            channels: default_channels(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Runtime mode and secrets.
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Language-model client configuration.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    /// YouTube client configuration.
    #[serde(default)]
    pub youtube: YouTubeConfig,
    /// Feed fetcher configuration.
    #[serde(default)]
    pub feeds: FeedsConfig,
    /// Ingestion pipeline configuration.
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Scheduler configuration.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Content sources.
    #[serde(default)]
    pub sources: SourcesConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(DigestError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| DigestError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `DEVDIGEST_DATABASE_URL`: database connection URL
    /// - `OPENAI_API_KEY`: language-model API key
    /// - `YOUTUBE_API_KEY`: YouTube Data API key
    /// - `CRON_SECRET`: cron trigger shared secret
    /// - `DEVDIGEST_MODE`: runtime mode
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        let overrides: [(&str, &mut String); 5] = [
            ("DEVDIGEST_DATABASE_URL", &mut self.database.url),
            ("OPENAI_API_KEY", &mut self.enrichment.api_key),
            ("YOUTUBE_API_KEY", &mut self.youtube.api_key),
            ("CRON_SECRET", &mut self.runtime.cron_secret),
            ("DEVDIGEST_MODE", &mut self.runtime.mode),
        ];
        for (name, field) in overrides {
            if let Ok(value) = std::env::var(name) {
                if !value.is_empty() {
                    *field = value;
                }
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the runtime mode is not `development` or `production`
    /// - the ingest batch size is zero
    /// - a feed URL or channel id is blank
    pub fn validate(&self) -> Result<()> {
        if self.runtime.mode != MODE_DEVELOPMENT && self.runtime.mode != MODE_PRODUCTION {
            return Err(DigestError::Config(format!(
                "unknown runtime mode '{}', expected '{}' or '{}'",
                self.runtime.mode, MODE_DEVELOPMENT, MODE_PRODUCTION
            )));
        }
        if self.ingest.batch_size == 0 {
            return Err(DigestError::Config(
                "ingest.batch_size must be at least 1".to_string(),
            ));
        }
        if self.sources.feeds.iter().any(|f| f.url.trim().is_empty()) {
            return Err(DigestError::Config("feed source with empty url".to_string()));
        }
        if self
            .sources
            .channels
            .iter()
            .any(|c| c.channel_id.trim().is_empty())
        {
            return Err(DigestError::Config(
                "channel source with empty channel_id".to_string(),
            ));
        }
        Ok(())
    }
}
