//! Runs every configured topic and assembles the crawl report
//!
//! Topics are crawled as separate tasks, at most `max_concurrent_topics` at a
//! time, with their starts spaced by the between-topics delay. Results are
//! collected in configuration order. A task that dies is replaced by an
//! empty outcome so the remaining topics are unaffected.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::watch;

use crate::config::Config;
use crate::crawler::fetcher::{Fetch, HttpFetcher};
use crate::crawler::limiter::{GatedFetcher, Pacer};
use crate::crawler::topic::TopicCrawler;
use crate::models::{CrawlReport, TopicOutcome, TopicSpec};
use crate::utils::error::FetchError;

pub struct CrawlCoordinator {
    crawler: TopicCrawler,
    topic_pacer: Arc<Pacer>,
    max_concurrent_topics: usize,
    shutdown: watch::Receiver<bool>,
}

impl CrawlCoordinator {
    /// Build a coordinator over any fetcher
    ///
    /// The fetcher is wrapped so that every request, listing or article,
    /// holds one of `max_concurrent_requests` shared permits.
    pub fn new(config: &Config, fetcher: Arc<dyn Fetch>, shutdown: watch::Receiver<bool>) -> Self {
        let gated: Arc<dyn Fetch> = Arc::new(GatedFetcher::new(
            fetcher,
            config.crawler.max_concurrent_requests,
        ));

        Self {
            crawler: TopicCrawler::new(&config.crawler, gated).with_shutdown(shutdown.clone()),
            topic_pacer: Arc::new(Pacer::new(config.topic_delay())),
            max_concurrent_topics: config.crawler.max_concurrent_topics.max(1),
            shutdown,
        }
    }

    /// Build a coordinator with the reqwest fetcher
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn from_config(config: &Config, shutdown: watch::Receiver<bool>) -> Result<Self, FetchError> {
        let fetcher = Arc::new(HttpFetcher::new(&config.crawler)?);
        Ok(Self::new(config, fetcher, shutdown))
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Crawl all topics and return the report
    ///
    /// Never fails. After a shutdown signal the report holds whatever was
    /// collected so far and is marked as interrupted.
    pub async fn run_all(&self, topics: &[TopicSpec]) -> CrawlReport {
        let started_at = Utc::now();
        tracing::info!(
            topics = topics.len(),
            max_concurrent_topics = self.max_concurrent_topics,
            "Starting crawl"
        );

        let outcomes: Vec<TopicOutcome> = stream::iter(topics.iter().cloned())
            .then(|topic| {
                let pacer = Arc::clone(&self.topic_pacer);
                let stopping = self.shutdown_requested();
                async move {
                    if !stopping {
                        pacer.wait().await;
                    }
                    topic
                }
            })
            .map(|topic| {
                let name = topic.name.clone();
                let crawler = self.crawler.clone();
                let handle = tokio::spawn(async move { crawler.run(topic).await });

                async move {
                    match handle.await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            tracing::error!(topic = %name, error = %e, "Topic task aborted");
                            TopicOutcome::aborted(&name)
                        }
                    }
                }
            })
            .buffered(self.max_concurrent_topics)
            .collect()
            .await;

        let interrupted = self.shutdown_requested();
        let report = CrawlReport::assemble(outcomes, started_at, interrupted);

        if interrupted {
            tracing::warn!(
                total_articles = report.total_articles,
                "Crawl interrupted, returning partial report"
            );
        } else {
            tracing::info!(
                total_articles = report.total_articles,
                topics_with_documents = report.topics.len(),
                "Crawl finished"
            );
        }

        report
    }
}
