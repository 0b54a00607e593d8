//! Listing page pagination
//!
//! A [`Paginator`] walks one topic's listing pages and yields distinct
//! candidate article links lazily, so no more pages are fetched than the
//! quota needs. The stream is finite and cannot be restarted.

use futures::stream::{self, BoxStream, StreamExt};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use url::Url;

use crate::config::CrawlerConfig;
use crate::crawler::discover::LinkDiscoverer;
use crate::crawler::fetcher::Fetch;
use crate::error::KabarErrorTrait;
use crate::metrics::{self, PageKind};
use crate::models::TopicSpec;
use crate::utils::error::{CrawlerError, FetchError};

/// Pagination limits for one topic
#[derive(Debug, Clone)]
pub struct PaginationOptions {
    /// Maximum distinct links yielded
    pub quota: usize,
    /// Highest page number fetched
    pub max_pages: u32,
    /// Query parameter carrying the page number
    pub page_param: String,
}

impl PaginationOptions {
    #[must_use]
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            quota: config.quota_per_topic,
            max_pages: config.max_pages,
            page_param: config.page_param.clone(),
        }
    }
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Counters a paginator reports while its stream is drained
#[derive(Debug, Default)]
pub struct ListingStats {
    pages_fetched: AtomicU32,
    links_discovered: AtomicU32,
    listing_failed: AtomicBool,
}

impl ListingStats {
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched.load(Ordering::Relaxed)
    }

    pub fn links_discovered(&self) -> u32 {
        self.links_discovered.load(Ordering::Relaxed)
    }

    pub fn listing_failed(&self) -> bool {
        self.listing_failed.load(Ordering::Relaxed)
    }
}

/// Paginated link source for one topic
pub struct Paginator {
    topic: String,
    listing_url: String,
    fetcher: Arc<dyn Fetch>,
    discoverer: LinkDiscoverer,
    options: PaginationOptions,
    stats: Arc<ListingStats>,

    next_page: u32,
    seen: HashSet<String>,
    pending: VecDeque<String>,
    yielded: usize,
    exhausted: bool,
}

impl Paginator {
    pub fn new(topic: &TopicSpec, fetcher: Arc<dyn Fetch>, options: PaginationOptions) -> Self {
        Self {
            topic: topic.name.clone(),
            listing_url: topic.listing_url.clone(),
            fetcher,
            discoverer: LinkDiscoverer::new(),
            options,
            stats: Arc::new(ListingStats::default()),
            next_page: 1,
            seen: HashSet::new(),
            pending: VecDeque::new(),
            yielded: 0,
            exhausted: false,
        }
    }

    /// Shared handle to the counters, readable after the stream is consumed
    pub fn stats(&self) -> Arc<ListingStats> {
        Arc::clone(&self.stats)
    }

    /// URL of listing page `page` (1-based)
    ///
    /// Page 1 is the listing URL as configured. Later pages carry the page
    /// number in the query, replacing any existing value for the same key.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` if the listing URL does not parse.
    pub fn page_url(&self, page: u32) -> Result<String, FetchError> {
        if page <= 1 {
            return Ok(self.listing_url.clone());
        }

        let mut url = Url::parse(&self.listing_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {e}", self.listing_url)))?;

        let param = self.options.page_param.as_str();
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != param)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(param, &page.to_string());

        Ok(url.to_string())
    }

    /// Consume the paginator into a lazy stream of distinct links
    pub fn into_stream(self) -> BoxStream<'static, String> {
        stream::unfold(self, |mut paginator| async move {
            let link = paginator.next_link().await?;
            Some((link, paginator))
        })
        .boxed()
    }

    async fn next_link(&mut self) -> Option<String> {
        loop {
            if self.yielded >= self.options.quota {
                return None;
            }

            if let Some(link) = self.pending.pop_front() {
                self.yielded += 1;
                return Some(link);
            }

            if self.exhausted || self.next_page > self.options.max_pages {
                return None;
            }

            let page = self.next_page;
            self.next_page += 1;
            self.load_page(page).await;
        }
    }

    /// Fetch one listing page and queue its unseen links
    async fn load_page(&mut self, page: u32) {
        let url = match self.page_url(page) {
            Ok(url) => url,
            Err(source) => {
                let url = self.listing_url.clone();
                self.listing_failed(page, url, source);
                return;
            }
        };

        let fetched = match self.fetcher.fetch(&url).await {
            Ok(fetched) => fetched,
            Err(source) => {
                self.listing_failed(page, url, source);
                return;
            }
        };

        self.stats.pages_fetched.fetch_add(1, Ordering::Relaxed);

        let base = Url::parse(&fetched.url)
            .or_else(|_| Url::parse(&url))
            .ok();
        let discovered = match base {
            Some(base) => self.discoverer.discover_html(&fetched.text(), &base),
            None => Default::default(),
        };

        if discovered.is_empty() {
            let err = CrawlerError::LinkDiscoveryEmpty { url: url.clone() };
            tracing::info!(topic = %self.topic, page, error = %err, "No article links on listing page");
        }

        let mut new_links = 0usize;
        for link in discovered.links {
            if self.seen.insert(link.clone()) {
                self.pending.push_back(link);
                new_links += 1;
            }
        }

        self.stats
            .links_discovered
            .fetch_add(new_links as u32, Ordering::Relaxed);
        metrics::record_listing_page(&self.topic, new_links);

        tracing::debug!(
            topic = %self.topic,
            page,
            rule = discovered.rule.unwrap_or("none"),
            new_links,
            total = self.seen.len(),
            "Processed listing page"
        );
    }

    fn listing_failed(&mut self, page: u32, url: String, source: FetchError) {
        let kind = source.kind();
        let err = CrawlerError::ListingFailed { url, source };
        if err.is_recoverable() {
            tracing::warn!(topic = %self.topic, page, kind = %kind, error = %err, "Listing page failed, stopping pagination");
        } else {
            tracing::error!(topic = %self.topic, page, error = %err, "Listing URL unusable, stopping pagination");
        }

        metrics::record_fetch_failure(&self.topic, PageKind::Listing, kind);
        self.stats.listing_failed.store(true, Ordering::Relaxed);
        self.exhausted = true;
    }
}
