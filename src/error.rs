//! Unified error handling for the kabar crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while keeping the domain errors usable on
//! their own inside the crawler.
//!
//! # Architecture
//!
//! - [`KabarErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors

use std::io;
use thiserror::Error;

pub use crate::utils::error::{CrawlerError, ExtractError, FetchError, FetchErrorKind};

/// Common trait for all kabar error types
pub trait KabarErrorTrait: std::error::Error {
    /// Check if this error is recoverable (the crawl can carry on past it)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, status)
    Network,
    /// Parsing and data extraction errors
    Parsing,
    /// Report writing and I/O errors
    Storage,
    /// Configuration and validation errors
    Config,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Storage => "storage",
            Self::Config => "config",
        };
        f.write_str(name)
    }
}

impl KabarErrorTrait for FetchError {
    fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidUrl(_))
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Network
    }
}

impl KabarErrorTrait for ExtractError {
    fn is_recoverable(&self) -> bool {
        true
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Parsing
    }
}

impl KabarErrorTrait for CrawlerError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Extract(e) => e.is_recoverable(),
            Self::LinkDiscoveryEmpty { .. } => true,
            // Pagination stops either way; the topic keeps what it already has
            Self::ListingFailed { source, .. } => source.is_recoverable(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) | Self::ListingFailed { .. } => ErrorCategory::Network,
            Self::Extract(_) | Self::LinkDiscoveryEmpty { .. } => ErrorCategory::Parsing,
        }
    }
}

/// Unified error type for the kabar crate
#[derive(Error, Debug)]
pub enum Error {
    /// Crawler-related errors (fetch, extract, crawl)
    #[error("Crawler error: {0}")]
    Crawler(#[from] CrawlerError),

    /// Fetch-specific errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Extraction-specific errors
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl KabarErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Crawler(e) => e.is_recoverable(),
            Self::Fetch(e) => e.is_recoverable(),
            Self::Extract(e) => e.is_recoverable(),
            Self::Io(_) => true,
            Self::Json(_) => false,
            Self::Config(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Crawler(e) => e.category(),
            Self::Fetch(_) => ErrorCategory::Network,
            Self::Extract(_) | Self::Json(_) => ErrorCategory::Parsing,
            Self::Io(_) => ErrorCategory::Storage,
            Self::Config(_) => ErrorCategory::Config,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
