//! HTTP fetching for listing and article pages
//!
//! [`Fetch`] is the seam between the crawl pipeline and the network: the
//! pipeline only ever sees [`FetchedPage`] values or a [`FetchError`].
//! [`HttpFetcher`] is the reqwest implementation with:
//! - browser-like headers and User-Agent rotation
//! - a per-request timeout (a timeout is a failure, never retried)
//! - charset-aware decoding via `encoding_rs`

use async_trait::async_trait;
use bytes::Bytes;
use encoding_rs::{Encoding, UTF_8};
use rand::seq::SliceRandom;
use reqwest::{header::CONTENT_TYPE, Client};
use std::time::Duration;
use url::Url;

use crate::config::CrawlerConfig;
use crate::crawler::headers::build_browser_headers;
use crate::utils::error::FetchError;

/// Pool of realistic User-Agent strings for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// Bytes of the body inspected for a `<meta charset>` declaration
const META_SNIFF_LEN: usize = 1024;

/// A successfully fetched page (2xx status)
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchedPage {
    /// Decode the body to text
    ///
    /// Uses the charset from the `Content-Type` header, then a `<meta charset>`
    /// declaration near the top of the document, then UTF-8. Undecodable bytes
    /// become U+FFFD.
    pub fn text(&self) -> String {
        let encoding = self
            .content_type
            .as_deref()
            .and_then(charset_from_content_type)
            .or_else(|| charset_from_meta(&self.body))
            .unwrap_or(UTF_8);

        let (text, _encoding, _had_errors) = encoding.decode(&self.body);
        text.into_owned()
    }
}

/// Anything that can retrieve a page by URL
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch one page
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Timeout`, `FetchError::Status` for non-2xx answers,
    /// or `FetchError::Network` / `FetchError::Http` for transport failures.
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// reqwest-backed fetcher for Kompas pages
pub struct HttpFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Fixed User-Agent; `None` rotates through [`USER_AGENTS`]
    user_agent: Option<String>,

    accept_language: String,
}

impl HttpFetcher {
    /// Create a fetcher from the crawler configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &CrawlerConfig) -> Result<Self, FetchError> {
        Self::with_timeout(
            Duration::from_secs(config.request_timeout_secs),
            config.user_agent.clone(),
            config.accept_language.clone(),
        )
    }

    /// Create a fetcher with an explicit timeout
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_timeout(
        timeout: Duration,
        user_agent: Option<String>,
        accept_language: String,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            user_agent,
            accept_language,
        })
    }

    fn user_agent(&self) -> &str {
        match &self.user_agent {
            Some(ua) => ua,
            None => random_user_agent(),
        }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        let headers = build_browser_headers(self.user_agent(), &self.accept_language);

        let response = self
            .client
            .get(parsed)
            .headers(headers)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(FetchError::from_reqwest)?;

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

/// Get a random user agent from the pool
fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS.choose(&mut rng).copied().unwrap_or(USER_AGENTS[0])
}

fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    content_type
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, value)| Encoding::for_label(value.trim().trim_matches('"').as_bytes()))
}

fn charset_from_meta(body: &[u8]) -> Option<&'static Encoding> {
    let head = &body[..body.len().min(META_SNIFF_LEN)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let start = head.find("charset=")? + "charset=".len();
    let label: String = head[start..]
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'))
        .collect();

    Encoding::for_label(label.as_bytes())
}
