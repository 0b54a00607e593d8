// Core data structures for the kabar crawler

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A configured news section with its own listing URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSpec {
    pub name: String,
    #[serde(rename = "url")]
    pub listing_url: String,
}

impl TopicSpec {
    pub fn new(name: impl Into<String>, listing_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            listing_url: listing_url.into(),
        }
    }
}

/// One extracted article. `title` is never empty once a record exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ArticleRecord {
    pub title: String,
    pub timestamp: String,
    pub content: String,
}

/// Documents collected for one topic, in link discovery order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicResult {
    pub topic: String,
    pub documents: Vec<ArticleRecord>,
}

impl TopicResult {
    pub fn empty(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            documents: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Per-topic counters reported to the operator, kept even for topics with no documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct TopicSummary {
    pub topic: String,
    pub pages_fetched: u32,
    pub links_discovered: u32,
    pub fetch_failures: u32,
    pub extraction_failures: u32,
    pub documents: u32,
    /// A listing page fetch failed and pagination stopped early
    pub listing_failed: bool,
    /// The topic task died and its result was replaced by an empty one
    pub aborted: bool,
}

impl TopicSummary {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Default::default()
        }
    }
}

/// What a topic crawl hands back to the coordinator
#[derive(Debug, Clone)]
pub struct TopicOutcome {
    pub result: TopicResult,
    pub summary: TopicSummary,
}

impl TopicOutcome {
    /// Outcome for a topic that produced nothing, e.g. after its task died
    pub fn aborted(topic: &str) -> Self {
        let mut summary = TopicSummary::new(topic);
        summary.aborted = true;
        Self {
            result: TopicResult::empty(topic),
            summary,
        }
    }
}

/// Final aggregate of a crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Non-empty topic results, in configured order
    pub topics: Vec<TopicResult>,
    pub total_articles: usize,
    /// One entry per configured topic, before empty results are filtered out
    pub summaries: Vec<TopicSummary>,
    /// Whether the run was cut short by a shutdown signal
    pub interrupted: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    /// Assemble the report from per-topic results in configured order
    pub fn assemble(
        outcomes: Vec<TopicOutcome>,
        started_at: DateTime<Utc>,
        interrupted: bool,
    ) -> Self {
        let mut topics = Vec::with_capacity(outcomes.len());
        let mut summaries = Vec::with_capacity(outcomes.len());

        for TopicOutcome { result, summary } in outcomes {
            summaries.push(summary);
            if !result.is_empty() {
                topics.push(result);
            }
        }

        let total_articles = topics.iter().map(TopicResult::len).sum();

        Self {
            topics,
            total_articles,
            summaries,
            interrupted,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Aggregate statistics over every topic summary
    pub fn stats(&self) -> CrawlStats {
        let mut stats = CrawlStats {
            topics_configured: self.summaries.len() as u32,
            topics_with_documents: self.topics.len() as u32,
            total_articles: self.total_articles as u32,
            duration_secs: (self.finished_at - self.started_at).num_seconds().max(0) as u64,
            ..Default::default()
        };

        for summary in &self.summaries {
            stats.pages_fetched += summary.pages_fetched;
            stats.links_discovered += summary.links_discovered;
            stats.fetch_failures += summary.fetch_failures;
            stats.extraction_failures += summary.extraction_failures;
        }

        stats
    }
}

/// Crawl statistics
#[derive(Debug, Clone, Serialize, Default)]
pub struct CrawlStats {
    pub topics_configured: u32,
    pub topics_with_documents: u32,
    pub total_articles: u32,
    pub pages_fetched: u32,
    pub links_discovered: u32,
    pub fetch_failures: u32,
    pub extraction_failures: u32,
    pub duration_secs: u64,
}

impl CrawlStats {
    /// Share of discovered links that did not become a document, as a percentage
    pub fn failure_rate(&self) -> f64 {
        if self.links_discovered == 0 {
            0.0
        } else {
            let failed = self.fetch_failures + self.extraction_failures;
            (failed as f64 / self.links_discovered as f64) * 100.0
        }
    }

    /// Calculate crawl rate (articles per minute)
    pub fn crawl_rate(&self) -> f64 {
        if self.duration_secs == 0 {
            0.0
        } else {
            (self.total_articles as f64 / self.duration_secs as f64) * 60.0
        }
    }
}
