//! Error types for the kabar crawler
//!
//! This module defines the domain errors raised while fetching listing pages and
//! articles, extracting article fields, and driving a topic crawl.

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// Request did not complete within the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Server answered with a non-success status code
    #[error("HTTP status {0}")]
    Status(u16),

    /// Connection, DNS or TLS failure
    #[error("Network error: {0}")]
    Network(String),

    /// Any other HTTP client error (body read, builder, redirect)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Coarse classification of a [`FetchError`], used for counting and metric labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    Timeout,
    HttpStatus,
    Network,
}

impl FetchErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::HttpStatus => "http_status",
            Self::Network => "network",
        }
    }
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FetchError {
    /// Classify a reqwest error into timeout, connect or generic HTTP failure
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Network(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Http(err)
        }
    }

    /// Which of the three fetch failure families this error belongs to
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Timeout => FetchErrorKind::Timeout,
            Self::Status(_) => FetchErrorKind::HttpStatus,
            Self::Network(_) | Self::Http(_) | Self::InvalidUrl(_) => FetchErrorKind::Network,
        }
    }
}

/// Errors that can occur while extracting an article from its document tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// No title rule produced a non-empty match
    #[error("Title not found in article")]
    NoTitle,
}

/// General crawler errors
#[derive(Error, Debug)]
pub enum CrawlerError {
    /// Fetch error
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Extraction error
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// No link rule matched on a listing page
    #[error("No article links found on listing page {url}")]
    LinkDiscoveryEmpty { url: String },

    /// A listing page could not be fetched; pagination for the topic ends here
    #[error("Listing page {url} failed: {source}")]
    ListingFailed {
        url: String,
        #[source]
        source: FetchError,
    },
}

impl CrawlerError {
    /// Failure kind of the underlying fetch, if this error came from one
    pub fn fetch_kind(&self) -> Option<FetchErrorKind> {
        match self {
            Self::Fetch(e) | Self::ListingFailed { source: e, .. } => Some(e.kind()),
            Self::Extract(_) | Self::LinkDiscoveryEmpty { .. } => None,
        }
    }
}
