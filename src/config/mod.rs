//! Configuration management for the kabar crawler
//!
//! Configuration is layered: built-in defaults, then an optional TOML file, then
//! `KABAR_*` environment variables. [`Config::validate`] must pass before any
//! network activity starts.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::models::TopicSpec;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Crawler configuration
    pub crawler: CrawlerConfig,

    /// Topics to crawl, in report order
    pub topics: Vec<TopicSpec>,

    /// Output configuration
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Crawler-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum documents kept per topic
    pub quota_per_topic: usize,

    /// Maximum listing pages fetched per topic
    pub max_pages: u32,

    /// Query parameter carrying the page number on listing pages
    pub page_param: String,

    /// Minimum interval between requests within a topic, listing pages included (milliseconds)
    pub article_delay_ms: u64,

    /// Minimum interval between topic starts (milliseconds)
    pub topic_delay_ms: u64,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Maximum number of fetches in flight across all topics
    pub max_concurrent_requests: usize,

    /// Maximum number of topics crawled at the same time
    pub max_concurrent_topics: usize,

    /// Maximum number of article fetches in flight within one topic
    pub article_concurrency: usize,

    /// Fixed User-Agent; when unset a browser User-Agent is picked per request
    pub user_agent: Option<String>,

    /// Accept-Language header value
    pub accept_language: String,

    /// Paragraphs shorter than this many characters are dropped from content
    pub min_paragraph_chars: usize,

    /// Optional hard cap on content length in characters
    pub max_content_chars: Option<usize>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the JSON report
    pub path: PathBuf,

    /// Pretty-print the JSON report
    pub pretty: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

/// The Kompas sections crawled when no topics are configured
pub fn default_topics() -> Vec<TopicSpec> {
    vec![
        TopicSpec::new("Trending", "https://www.kompas.com/terkini"),
        TopicSpec::new("Tekno", "https://tekno.kompas.com/index"),
        TopicSpec::new("Otomotif", "https://otomotif.kompas.com/index"),
        TopicSpec::new("Bola", "https://bola.kompas.com/index"),
        TopicSpec::new("Lifestyle", "https://lifestyle.kompas.com/index"),
        TopicSpec::new("Health", "https://health.kompas.com/index"),
        TopicSpec::new("Money", "https://money.kompas.com/index"),
        TopicSpec::new("Properti", "https://properti.kompas.com/index"),
        TopicSpec::new("Edukasi", "https://edukasi.kompas.com/index"),
        TopicSpec::new("Travel", "https://travel.kompas.com/index"),
    ]
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            quota_per_topic: 10,
            max_pages: 10,
            page_param: String::from("page"),
            article_delay_ms: 500,
            topic_delay_ms: 1000,
            request_timeout_secs: 10,
            max_concurrent_requests: 8,
            max_concurrent_topics: 4,
            article_concurrency: 2,
            user_agent: None,
            accept_language: String::from("en-US,en;q=0.5"),
            min_paragraph_chars: 21,
            max_content_chars: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("documents.json"),
            pretty: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            topics: default_topics(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))
    }

    /// Parse configuration from TOML text; missing keys fall back to defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load defaults, then the optional file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override individual settings from `KABAR_*` environment variables
    pub fn apply_env_overrides(&mut self) {
        fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
            std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
        }

        if let Some(v) = env_parse("KABAR_QUOTA_PER_TOPIC") {
            self.crawler.quota_per_topic = v;
        }
        if let Some(v) = env_parse("KABAR_MAX_PAGES") {
            self.crawler.max_pages = v;
        }
        if let Some(v) = env_parse("KABAR_ARTICLE_DELAY_MS") {
            self.crawler.article_delay_ms = v;
        }
        if let Some(v) = env_parse("KABAR_TOPIC_DELAY_MS") {
            self.crawler.topic_delay_ms = v;
        }
        if let Some(v) = env_parse("KABAR_REQUEST_TIMEOUT") {
            self.crawler.request_timeout_secs = v;
        }
        if let Some(v) = env_parse("KABAR_MAX_CONCURRENT_REQUESTS") {
            self.crawler.max_concurrent_requests = v;
        }
        if let Some(v) = env_parse("KABAR_MAX_CONCURRENT_TOPICS") {
            self.crawler.max_concurrent_topics = v;
        }
        if let Some(v) = env_parse("KABAR_ARTICLE_CONCURRENCY") {
            self.crawler.article_concurrency = v;
        }
        if let Ok(param) = std::env::var("KABAR_PAGE_PARAM") {
            self.crawler.page_param = param;
        }
        if let Some(v) = env_parse("KABAR_MIN_PARAGRAPH_CHARS") {
            self.crawler.min_paragraph_chars = v;
        }
        // 0 lifts the cap
        if let Some(v) = env_parse::<usize>("KABAR_MAX_CONTENT_CHARS") {
            self.crawler.max_content_chars = (v > 0).then_some(v);
        }
        if let Ok(ua) = std::env::var("KABAR_USER_AGENT") {
            self.crawler.user_agent = Some(ua);
        }
        if let Ok(path) = std::env::var("KABAR_OUTPUT") {
            self.output.path = PathBuf::from(path);
        }
        if let Ok(level) = std::env::var("KABAR_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("KABAR_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.topics.is_empty() {
            anyhow::bail!("at least one topic must be configured");
        }

        if self.crawler.quota_per_topic == 0 {
            anyhow::bail!("quota_per_topic must be greater than 0");
        }

        if self.crawler.max_pages == 0 {
            anyhow::bail!("max_pages must be greater than 0");
        }

        if self.crawler.max_concurrent_requests == 0 {
            anyhow::bail!("max_concurrent_requests must be greater than 0");
        }

        if self.crawler.max_concurrent_topics == 0 {
            anyhow::bail!("max_concurrent_topics must be greater than 0");
        }

        if self.crawler.article_concurrency == 0 {
            anyhow::bail!("article_concurrency must be greater than 0");
        }

        if self.crawler.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.crawler.page_param.trim().is_empty() {
            anyhow::bail!("page_param must not be empty");
        }

        let mut names = HashSet::new();
        for topic in &self.topics {
            if topic.name.trim().is_empty() {
                anyhow::bail!("topic names must not be empty");
            }
            if !names.insert(topic.name.as_str()) {
                anyhow::bail!("duplicate topic name: {}", topic.name);
            }

            let url = Url::parse(&topic.listing_url).with_context(|| {
                format!(
                    "invalid listing URL for topic {}: {}",
                    topic.name, topic.listing_url
                )
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                anyhow::bail!(
                    "listing URL for topic {} must use http or https: {}",
                    topic.name,
                    topic.listing_url
                );
            }
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.crawler.request_timeout_secs)
    }

    #[must_use]
    pub fn article_delay(&self) -> Duration {
        Duration::from_millis(self.crawler.article_delay_ms)
    }

    #[must_use]
    pub fn topic_delay(&self) -> Duration {
        Duration::from_millis(self.crawler.topic_delay_ms)
    }
}
