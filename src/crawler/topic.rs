//! Per-topic crawl pipeline
//!
//! Paginator stream of distinct links -> article fetches, at most
//! `article_concurrency` in flight, reassembled in discovery order ->
//! extraction -> quota-bounded document list. Every request of a topic,
//! listing or article, goes through one pacer. Failures of single articles
//! are counted and skipped; the topic always produces an outcome.

use futures::stream::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::Fetch;
use crate::crawler::limiter::{PacedFetcher, Pacer};
use crate::crawler::list::{ListingStats, PaginationOptions, Paginator};
use crate::crawler::wait_for_shutdown;
use crate::error::{ErrorCategory, KabarErrorTrait};
use crate::metrics::{self, PageKind};
use crate::models::{ArticleRecord, TopicOutcome, TopicResult, TopicSpec, TopicSummary};
use crate::parser::ArticleExtractor;
use crate::utils::error::{CrawlerError, FetchErrorKind};
use crate::utils::truncate_url;

/// Mutable state of one topic crawl, owned by that crawl alone
pub struct TopicContext {
    quota: usize,
    documents: Vec<ArticleRecord>,
    summary: TopicSummary,
}

impl TopicContext {
    pub fn new(topic: &str, quota: usize) -> Self {
        Self {
            quota,
            documents: Vec::with_capacity(quota),
            summary: TopicSummary::new(topic),
        }
    }

    fn topic(&self) -> &str {
        &self.summary.topic
    }

    pub fn is_full(&self) -> bool {
        self.documents.len() >= self.quota
    }

    /// Account for the result of one article
    pub fn record(&mut self, url: &str, result: Result<ArticleRecord, CrawlerError>) {
        match result {
            Ok(record) => {
                if self.is_full() {
                    tracing::debug!(topic = %self.topic(), url = %url, "Quota reached, dropping article");
                    return;
                }
                tracing::debug!(topic = %self.topic(), url = %truncate_url(url, 80), title = %record.title, "Article stored");
                metrics::record_article_stored(self.topic());
                self.documents.push(record);
            }
            Err(e) => match e.category() {
                ErrorCategory::Network => {
                    let kind = e.fetch_kind().unwrap_or(FetchErrorKind::Network);
                    if e.is_recoverable() {
                        tracing::warn!(topic = %self.topic(), url = %url, kind = %kind, error = %e, "Article fetch failed");
                    } else {
                        tracing::error!(topic = %self.topic(), url = %url, error = %e, "Unusable article link");
                    }
                    metrics::record_fetch_failure(self.topic(), PageKind::Article, kind);
                    self.summary.fetch_failures += 1;
                }
                _ => {
                    tracing::warn!(topic = %self.topic(), url = %url, error = %e, "Article extraction failed");
                    metrics::record_extraction_failure(self.topic());
                    self.summary.extraction_failures += 1;
                }
            },
        }
    }

    /// Close the context into the outcome handed to the coordinator
    pub fn finish(mut self, listing: &ListingStats) -> TopicOutcome {
        self.summary.pages_fetched = listing.pages_fetched();
        self.summary.links_discovered = listing.links_discovered();
        self.summary.listing_failed = listing.listing_failed();
        self.summary.documents = self.documents.len() as u32;

        TopicOutcome {
            result: TopicResult {
                topic: self.summary.topic.clone(),
                documents: self.documents,
            },
            summary: self.summary,
        }
    }
}

/// Crawls one topic at a time; cheap to clone into spawned tasks
#[derive(Clone)]
pub struct TopicCrawler {
    fetcher: Arc<dyn Fetch>,
    extractor: Arc<ArticleExtractor>,
    options: PaginationOptions,
    article_delay: Duration,
    article_concurrency: usize,
    shutdown: Option<watch::Receiver<bool>>,
}

impl TopicCrawler {
    pub fn new(config: &CrawlerConfig, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            fetcher,
            extractor: Arc::new(ArticleExtractor::from_config(config)),
            options: PaginationOptions::from_config(config),
            article_delay: Duration::from_millis(config.article_delay_ms),
            article_concurrency: config.article_concurrency.max(1),
            shutdown: None,
        }
    }

    /// Stop early once `shutdown` turns true
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Crawl one topic to completion, quota, or shutdown
    pub async fn run(&self, topic: TopicSpec) -> TopicOutcome {
        let _timer = metrics::start_topic_timer(&topic.name);
        tracing::info!(topic = %topic.name, url = %topic.listing_url, "Starting topic crawl");

        let pacer = Arc::new(Pacer::new(self.article_delay));
        let fetcher: Arc<dyn Fetch> = Arc::new(PacedFetcher::new(Arc::clone(&self.fetcher), pacer));

        let paginator = Paginator::new(&topic, Arc::clone(&fetcher), self.options.clone());
        let listing = paginator.stats();
        let mut ctx = TopicContext::new(&topic.name, self.options.quota);

        let articles = paginator
            .into_stream()
            .map(|url| {
                let fetcher = Arc::clone(&fetcher);
                let extractor = Arc::clone(&self.extractor);
                async move {
                    let result = fetch_article(fetcher.as_ref(), &extractor, &url).await;
                    (url, result)
                }
            })
            .buffered(self.article_concurrency)
            .take(self.options.quota);

        let mut articles = match self.shutdown.clone() {
            Some(rx) => articles.take_until(wait_for_shutdown(rx)).boxed(),
            None => articles.boxed(),
        };

        while let Some((url, result)) = articles.next().await {
            ctx.record(&url, result);
        }

        let outcome = ctx.finish(&listing);
        tracing::info!(
            topic = %outcome.summary.topic,
            documents = outcome.summary.documents,
            pages = outcome.summary.pages_fetched,
            fetch_failures = outcome.summary.fetch_failures,
            extraction_failures = outcome.summary.extraction_failures,
            "Finished topic crawl"
        );
        outcome
    }
}

/// Fetch one article page and extract its record
async fn fetch_article(
    fetcher: &dyn Fetch,
    extractor: &ArticleExtractor,
    url: &str,
) -> Result<ArticleRecord, CrawlerError> {
    let page = fetcher.fetch(url).await?;
    let record = extractor.extract_html(&page.text())?;
    Ok(record)
}
