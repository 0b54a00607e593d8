//! Topic crawling with politeness and concurrency limits
//!
//! This module implements the crawl-and-extract pipeline for Kompas topic
//! sections: listing pagination, link discovery, article fetching, and the
//! coordinator that runs every topic.

pub mod coordinator;
pub mod discover;
pub mod fetcher;
pub mod headers;
pub mod limiter;
pub mod list;
pub mod topic;

pub use coordinator::CrawlCoordinator;
pub use discover::{DiscoveredLinks, LinkDiscoverer};
pub use fetcher::{Fetch, FetchedPage, HttpFetcher};
pub use limiter::{GatedFetcher, PacedFetcher, Pacer};
pub use list::{PaginationOptions, Paginator};
pub use topic::{TopicContext, TopicCrawler};

use tokio::sync::watch;

/// Resolve once the shutdown flag becomes true
///
/// If the sender is gone without ever signalling, this never resolves.
pub(crate) async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
