//! Prometheus metrics for the kabar crawler
//!
//! This module tracks listing pages, stored articles, per-kind fetch failures,
//! extraction failures and topic crawl duration.
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, metrics operations become no-ops.

use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};
use std::sync::{Mutex, OnceLock};

use crate::utils::error::FetchErrorKind;

// ============================================================================
// Metrics Storage
// ============================================================================

/// Container for all crawler metrics
struct CrawlerMetrics {
    pages_fetched: CounterVec,
    links_discovered: CounterVec,
    articles_stored: CounterVec,
    fetch_failures: CounterVec,
    extraction_failures: CounterVec,
    topic_duration: HistogramVec,
}

/// Global storage for crawler metrics
static CRAWLER_METRICS: OnceLock<CrawlerMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

/// Serializes initialization so no caller observes a half-registered set
static METRICS_INIT_LOCK: Mutex<()> = Mutex::new(());

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// This function should be called once at application startup. Subsequent
/// calls return `Ok(())` without registering anything.
///
/// # Example
///
/// ```ignore
/// if let Err(e) = kabar::metrics::init_metrics() {
///     eprintln!("Warning: Metrics initialization failed: {}", e);
/// }
/// ```
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = METRICS_INIT_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    // Prevent double initialization
    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let crawler = CrawlerMetrics {
        pages_fetched: register_counter_vec!(
            "kabar_listing_pages_fetched_total",
            "Listing pages fetched per topic",
            &["topic"]
        )?,
        links_discovered: register_counter_vec!(
            "kabar_links_discovered_total",
            "Distinct candidate article links discovered per topic",
            &["topic"]
        )?,
        articles_stored: register_counter_vec!(
            "kabar_articles_stored_total",
            "Articles extracted and kept per topic",
            &["topic"]
        )?,
        fetch_failures: register_counter_vec!(
            "kabar_fetch_failures_total",
            "Failed page fetches by topic, page kind and failure kind",
            &["topic", "page", "kind"]
        )?,
        extraction_failures: register_counter_vec!(
            "kabar_extraction_failures_total",
            "Article pages without an extractable title",
            &["topic"]
        )?,
        topic_duration: register_histogram_vec!(
            "kabar_topic_crawl_duration_seconds",
            "Time spent crawling a topic in seconds",
            &["topic"],
            vec![1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]
        )?,
    };

    CRAWLER_METRICS
        .set(crawler)
        .map_err(|_| "Crawler metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    CRAWLER_METRICS.get().is_some()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Which kind of page a fetch was for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Listing,
    Article,
}

impl PageKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Listing => "listing",
            Self::Article => "article",
        }
    }
}

pub fn record_listing_page(topic: &str, new_links: usize) {
    let Some(m) = CRAWLER_METRICS.get() else {
        return;
    };

    m.pages_fetched.with_label_values(&[topic]).inc();
    if new_links > 0 {
        m.links_discovered
            .with_label_values(&[topic])
            .inc_by(new_links as f64);
    }
}

pub fn record_article_stored(topic: &str) {
    if let Some(m) = CRAWLER_METRICS.get() {
        m.articles_stored.with_label_values(&[topic]).inc();
    }
}

pub fn record_fetch_failure(topic: &str, page: PageKind, kind: FetchErrorKind) {
    if let Some(m) = CRAWLER_METRICS.get() {
        m.fetch_failures
            .with_label_values(&[topic, page.as_str(), kind.as_str()])
            .inc();
    }
}

pub fn record_extraction_failure(topic: &str) {
    if let Some(m) = CRAWLER_METRICS.get() {
        m.extraction_failures.with_label_values(&[topic]).inc();
    }
}

/// Histogram timer guard that records duration on drop
pub struct MetricsTimer {
    timer: Option<prometheus::HistogramTimer>,
}

impl MetricsTimer {
    fn new(timer: prometheus::HistogramTimer) -> Self {
        Self { timer: Some(timer) }
    }

    /// Create a no-op timer when metrics are not initialized
    fn noop() -> Self {
        Self { timer: None }
    }
}

impl Drop for MetricsTimer {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop_and_record();
        }
    }
}

/// Start a topic crawl timer; the duration is recorded when the guard drops
pub fn start_topic_timer(topic: &str) -> MetricsTimer {
    match CRAWLER_METRICS.get() {
        Some(m) => MetricsTimer::new(m.topic_duration.with_label_values(&[topic]).start_timer()),
        None => MetricsTimer::noop(),
    }
}

// ============================================================================
// Tests
// ============================================================================
