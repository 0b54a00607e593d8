//! kabar - topic-scoped news crawler for Kompas
//!
//! Crawls configured news sections, discovers article links across paginated
//! listings, extracts title, timestamp and body text through selector fallback
//! chains, and writes one JSON document collection per run.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Pagination, link discovery, fetching and the crawl coordinator
//! - [`parser`] - Article extraction and selector rule tables
//! - [`models`] - Core data structures and types
//! - [`storage`] - JSON report output
//! - [`metrics`] - Prometheus counters and histograms
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use kabar::config::Config;
//! use kabar::crawler::CrawlCoordinator;
//! use kabar::storage::ReportWriter;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     config.validate()?;
//!
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     let coordinator = CrawlCoordinator::from_config(&config, shutdown_rx)?;
//!     let report = coordinator.run_all(&config.topics).await;
//!
//!     ReportWriter::from_config(&config.output).write(&report).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod metrics;
pub mod models;
pub mod parser;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::{CrawlCoordinator, Fetch, HttpFetcher, TopicCrawler};
    pub use crate::error::{Error, ErrorCategory, KabarErrorTrait, Result};
    pub use crate::models::{ArticleRecord, CrawlReport, CrawlStats, TopicResult, TopicSpec};
    pub use crate::parser::ArticleExtractor;
    pub use crate::storage::ReportWriter;
}

// Direct re-exports for convenience
pub use models::{ArticleRecord, CrawlReport, TopicResult, TopicSpec};
