//! End-to-end pipeline integration tests
//!
//! Tests the complete workflow:
//! 1. Listing pagination and link discovery (mocked HTTP)
//! 2. Article fetch and extraction
//! 3. Per-topic quota and ordering
//! 4. Multi-topic coordination
//! 5. JSON report output

use futures::StreamExt;
use kabar::config::CrawlerConfig;
use kabar::crawler::list::{PaginationOptions, Paginator};
use kabar::crawler::{CrawlCoordinator, Fetch, HttpFetcher, TopicCrawler};
use kabar::models::TopicSpec;
use kabar::storage::{read_report, ReportWriter};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{
    listing_with_links, CountingFetch, NO_TITLE_HTML, SAMPLE_ARTICLE_HTML,
    SAMPLE_ARTICLE_HTML_ALT,
};
use crate::common::{
    fast_crawler_config, first_page, listing_html, mount_listing_page, mount_topic, test_config,
};

fn http_fetcher() -> Arc<dyn Fetch> {
    Arc::new(HttpFetcher::new(&fast_crawler_config()).unwrap())
}

// ============================================================================
// Pagination Tests
// ============================================================================

#[tokio::test]
async fn test_paginator_skips_empty_first_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bola/index"))
        .and(first_page)
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&mock_server)
        .await;

    let hrefs: Vec<String> = (1..=3).map(|i| format!("/bola/read/{i}")).collect();
    mount_listing_page(&mock_server, "bola", 2, listing_html(&hrefs)).await;

    let topic = TopicSpec::new("Bola", format!("{}/bola/index", mock_server.uri()));
    let options = PaginationOptions {
        quota: 10,
        max_pages: 2,
        page_param: "page".into(),
    };
    let paginator = Paginator::new(&topic, http_fetcher(), options);
    let stats = paginator.stats();

    let links: Vec<String> = paginator.into_stream().collect().await;

    assert_eq!(
        links,
        vec![
            format!("{}/bola/read/1", mock_server.uri()),
            format!("{}/bola/read/2", mock_server.uri()),
            format!("{}/bola/read/3", mock_server.uri()),
        ]
    );
    assert_eq!(stats.pages_fetched(), 2);
    assert!(!stats.listing_failed());
}

#[tokio::test]
async fn test_paginator_halts_at_max_pages() {
    let mock_server = MockServer::start().await;

    // Every page of this listing is empty
    Mock::given(method("GET"))
        .and(path("/money/index"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&mock_server)
        .await;

    let topic = TopicSpec::new("Money", format!("{}/money/index", mock_server.uri()));
    let options = PaginationOptions {
        quota: 10,
        max_pages: 3,
        page_param: "page".into(),
    };
    let links: Vec<String> = Paginator::new(&topic, http_fetcher(), options)
        .into_stream()
        .collect()
        .await;

    assert!(links.is_empty());
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[2].url.query(), Some("page=3"));
}

// ============================================================================
// Topic Crawl Tests
// ============================================================================

#[tokio::test]
async fn test_topic_crawl_end_to_end() {
    let mock_server = MockServer::start().await;
    let topic = mount_topic(&mock_server, "Tekno", "tekno", 3).await;

    let crawler = TopicCrawler::new(&fast_crawler_config(), http_fetcher());
    let outcome = crawler.run(topic).await;

    let titles: Vec<_> = outcome
        .result
        .documents
        .iter()
        .map(|d| d.title.as_str())
        .collect();
    assert_eq!(
        titles,
        vec!["Tekno artikel 0", "Tekno artikel 1", "Tekno artikel 2"]
    );
    assert_eq!(
        outcome.result.documents[0].timestamp,
        "Kompas.com - 15/01/2024, 10:00 WIB"
    );
    assert_eq!(
        outcome.result.documents[0].content,
        "Paragraf pembuka yang cukup panjang untuk disimpan."
    );
    assert_eq!(outcome.summary.links_discovered, 3);
    // Page 2 is not mounted, so pagination ends on a 404
    assert!(outcome.summary.listing_failed);
}

#[tokio::test]
async fn test_topic_quota_limits_article_fetches() {
    let mock_server = MockServer::start().await;
    let topic = mount_topic(&mock_server, "Health", "health", 8).await;

    let config = CrawlerConfig {
        quota_per_topic: 3,
        ..fast_crawler_config()
    };
    let outcome = TopicCrawler::new(&config, http_fetcher()).run(topic).await;

    assert_eq!(outcome.result.documents.len(), 3);
    assert_eq!(outcome.summary.pages_fetched, 1);
    assert!(!outcome.summary.listing_failed);

    let article_requests = mock_server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path().contains("/read/"))
        .count();
    assert_eq!(article_requests, 3);
}

#[tokio::test]
async fn test_mixed_article_layouts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/travel/index"))
        .and(first_page)
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_with_links(&[
            "/travel/read/a",
            "/travel/read/b",
            "/travel/read/c",
        ])))
        .mount(&mock_server)
        .await;

    for (slug, body) in [
        ("a", SAMPLE_ARTICLE_HTML),
        ("b", NO_TITLE_HTML),
        ("c", SAMPLE_ARTICLE_HTML_ALT),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/travel/read/{slug}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;
    }

    let topic = TopicSpec::new("Travel", format!("{}/travel/index", mock_server.uri()));
    let config = CrawlerConfig {
        max_pages: 1,
        ..fast_crawler_config()
    };
    let outcome = TopicCrawler::new(&config, http_fetcher()).run(topic).await;

    let docs = &outcome.result.documents;
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].title, "Kereta Cepat Whoosh Angkut 5 Juta Penumpang");
    assert!(!docs[0].content.contains("Baca juga"));
    assert_eq!(docs[1].title, "Menikmati Senja di Pantai Kuta");
    assert_eq!(docs[1].timestamp, "2024-01-14T17:45:00+08:00");
    assert_eq!(outcome.summary.extraction_failures, 1);
    assert_eq!(outcome.summary.fetch_failures, 0);
}

// ============================================================================
// Coordinator Tests
// ============================================================================

#[tokio::test]
async fn test_ten_topics_ten_documents_each() {
    let mock_server = MockServer::start().await;

    let mut topics = Vec::new();
    for i in 0..10 {
        let name = format!("Topik{i}");
        let slug = format!("topik{i}");
        topics.push(mount_topic(&mock_server, &name, &slug, 10).await);
    }

    let config = test_config(topics.clone());
    let (_tx, rx) = watch::channel(false);
    let coordinator = CrawlCoordinator::from_config(&config, rx).unwrap();
    let report = coordinator.run_all(&config.topics).await;

    assert_eq!(report.total_articles, 100);
    assert!(!report.interrupted);
    let names: Vec<_> = report.topics.iter().map(|t| t.topic.as_str()).collect();
    let expected: Vec<_> = topics.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, expected);
    assert!(report.topics.iter().all(|t| t.documents.len() == 10));
    assert_eq!(report.summaries.len(), 10);

    let stats = report.stats();
    assert_eq!(stats.topics_with_documents, 10);
    assert_eq!(stats.pages_fetched, 10);
    assert_eq!(stats.failure_rate(), 0.0);
}

#[tokio::test]
async fn test_request_cap_applies_across_topics() {
    let fetcher = Arc::new(CountingFetch::new(Duration::from_millis(20)));
    let topics: Vec<TopicSpec> = (0..4)
        .map(|i| TopicSpec::new(format!("T{i}"), format!("https://t{i}.kompas.test/index")))
        .collect();

    let mut config = test_config(topics);
    config.crawler.max_concurrent_requests = 2;
    config.crawler.max_concurrent_topics = 4;
    config.crawler.article_concurrency = 3;
    config.crawler.max_pages = 1;

    let (_tx, rx) = watch::channel(false);
    let shared: Arc<dyn Fetch> = fetcher.clone();
    let report = CrawlCoordinator::new(&config, shared, rx)
        .run_all(&config.topics)
        .await;

    assert_eq!(report.total_articles, 20);
    assert!(fetcher.peak() <= 2, "peak in-flight {}", fetcher.peak());
}

// ============================================================================
// Report Output Tests
// ============================================================================

#[tokio::test]
async fn test_report_written_in_topic_order() {
    let temp_dir = TempDir::new().unwrap();
    let mock_server = MockServer::start().await;

    let topics = vec![
        mount_topic(&mock_server, "Edukasi", "edukasi", 2).await,
        mount_topic(&mock_server, "Kosong", "kosong", 0).await,
        mount_topic(&mock_server, "Properti", "properti", 1).await,
    ];
    let mut config = test_config(topics);
    config.crawler.max_pages = 1;
    config.output.path = temp_dir.path().join("hasil/documents.json");

    let (_tx, rx) = watch::channel(false);
    let report = CrawlCoordinator::from_config(&config, rx)
        .unwrap()
        .run_all(&config.topics)
        .await;

    let path = ReportWriter::from_config(&config.output)
        .write(&report)
        .await
        .unwrap();
    assert_eq!(path, config.output.path);

    let written = read_report(&path).await.unwrap();
    let names: Vec<_> = written.iter().map(|t| t.topic.as_str()).collect();
    assert_eq!(names, vec!["Edukasi", "Properti"]);
    assert_eq!(written[0].documents.len(), 2);
    assert_eq!(written[0].documents[1].title, "Edukasi artikel 1");

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let first = &raw[0]["documents"][0];
    assert!(first.get("title").is_some());
    assert!(first.get("timestamp").is_some());
    assert!(first.get("content").is_some());
}
