//! Error scenario integration tests
//!
//! Tests various failure modes and error handling:
//! 1. Listing failures (HTTP errors, timeouts)
//! 2. Article failures (HTTP errors, missing titles)
//! 3. Topic isolation, including a panicking topic task
//! 4. Graceful shutdown with partial results

use kabar::config::CrawlerConfig;
use kabar::crawler::{CrawlCoordinator, Fetch, HttpFetcher, TopicCrawler};
use kabar::models::TopicSpec;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{listing_with_links, PanickingFetch, NO_TITLE_HTML, SAMPLE_ARTICLE_HTML};
use crate::common::{article_html, fast_crawler_config, first_page, mount_topic, test_config};

// ============================================================================
// Listing Failure Tests
// ============================================================================

#[tokio::test]
async fn test_failing_listing_does_not_affect_other_topics() {
    let mock_server = MockServer::start().await;

    let lifestyle = mount_topic(&mock_server, "Lifestyle", "lifestyle", 3).await;
    let otomotif = mount_topic(&mock_server, "Otomotif", "otomotif", 2).await;

    Mock::given(method("GET"))
        .and(path("/rusak/index"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    let rusak = TopicSpec::new("Rusak", format!("{}/rusak/index", mock_server.uri()));

    let config = test_config(vec![lifestyle, rusak, otomotif]);
    let (_tx, rx) = watch::channel(false);
    let report = CrawlCoordinator::from_config(&config, rx)
        .unwrap()
        .run_all(&config.topics)
        .await;

    let names: Vec<_> = report.topics.iter().map(|t| t.topic.as_str()).collect();
    assert_eq!(names, vec!["Lifestyle", "Otomotif"]);
    assert_eq!(report.total_articles, 5);

    let rusak = &report.summaries[1];
    assert_eq!(rusak.topic, "Rusak");
    assert!(rusak.listing_failed);
    assert_eq!(rusak.pages_fetched, 0);
    assert_eq!(rusak.documents, 0);
}

#[tokio::test]
async fn test_listing_timeout_ends_topic() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/lambat/index"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_with_links(&["/lambat/read/1"]))
                .set_delay(Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = CrawlerConfig {
        request_timeout_secs: 1,
        ..fast_crawler_config()
    };
    let fetcher: Arc<dyn Fetch> = Arc::new(HttpFetcher::new(&config).unwrap());
    let topic = TopicSpec::new("Lambat", format!("{}/lambat/index", mock_server.uri()));

    let outcome = TopicCrawler::new(&config, fetcher).run(topic).await;

    assert!(outcome.result.is_empty());
    assert!(outcome.summary.listing_failed);
    assert_eq!(outcome.summary.pages_fetched, 0);
}

#[tokio::test]
async fn test_no_links_anywhere_yields_no_topic() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sepi/index"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body><p>Tidak ada berita.</p></body></html>"),
        )
        .mount(&mock_server)
        .await;

    let mut config = test_config(vec![TopicSpec::new(
        "Sepi",
        format!("{}/sepi/index", mock_server.uri()),
    )]);
    config.crawler.max_pages = 4;

    let (_tx, rx) = watch::channel(false);
    let report = CrawlCoordinator::from_config(&config, rx)
        .unwrap()
        .run_all(&config.topics)
        .await;

    assert!(report.topics.is_empty());
    assert_eq!(report.total_articles, 0);
    assert_eq!(report.summaries[0].pages_fetched, 4);
    assert!(!report.summaries[0].listing_failed);
}

// ============================================================================
// Article Failure Tests
// ============================================================================

#[tokio::test]
async fn test_article_failures_are_skipped_and_counted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/money/index"))
        .and(first_page)
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_with_links(&[
            "/money/read/ok",
            "/money/read/hilang",
            "/money/read/error",
            "/money/read/tanpa-judul",
            "/money/read/ok-2",
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/money/read/ok(-2)?$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_ARTICLE_HTML))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/money/read/hilang"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/money/read/error"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/money/read/tanpa-judul"))
        .respond_with(ResponseTemplate::new(200).set_body_string(NO_TITLE_HTML))
        .mount(&mock_server)
        .await;

    let config = CrawlerConfig {
        max_pages: 1,
        ..fast_crawler_config()
    };
    let fetcher: Arc<dyn Fetch> = Arc::new(HttpFetcher::new(&config).unwrap());
    let topic = TopicSpec::new("Money", format!("{}/money/index", mock_server.uri()));

    let outcome = TopicCrawler::new(&config, fetcher).run(topic).await;

    assert_eq!(outcome.result.documents.len(), 2);
    assert_eq!(outcome.summary.fetch_failures, 2);
    assert_eq!(outcome.summary.extraction_failures, 1);
    assert_eq!(outcome.summary.links_discovered, 5);
}

// ============================================================================
// Isolation Tests
// ============================================================================

#[tokio::test]
async fn test_panicking_topic_is_reported_as_aborted() {
    let pages = vec![
        (
            "https://aman.kompas.test/index".to_string(),
            listing_with_links(&["/read/1", "/read/2"]),
        ),
        (
            "https://aman.kompas.test/read/1".to_string(),
            article_html("Berita Aman Satu", &[]),
        ),
        (
            "https://aman.kompas.test/read/2".to_string(),
            article_html("Berita Aman Dua", &[]),
        ),
    ];
    let fetcher: Arc<dyn Fetch> = Arc::new(PanickingFetch::new(pages, "boom"));

    let mut config = test_config(vec![
        TopicSpec::new("Meledak", "https://boom.kompas.test/index"),
        TopicSpec::new("Aman", "https://aman.kompas.test/index"),
    ]);
    config.crawler.max_pages = 1;

    let (_tx, rx) = watch::channel(false);
    let report = CrawlCoordinator::new(&config, fetcher, rx)
        .run_all(&config.topics)
        .await;

    assert_eq!(report.summaries.len(), 2);
    assert!(report.summaries[0].aborted);
    assert_eq!(report.summaries[0].topic, "Meledak");
    assert!(!report.summaries[1].aborted);

    assert_eq!(report.topics.len(), 1);
    assert_eq!(report.topics[0].topic, "Aman");
    assert_eq!(report.total_articles, 2);
}

// ============================================================================
// Shutdown Tests
// ============================================================================

#[tokio::test]
async fn test_shutdown_returns_partial_report() {
    let mock_server = MockServer::start().await;

    let hrefs: Vec<String> = (0..10).map(|i| format!("/bola/read/{i}")).collect();
    let refs: Vec<&str> = hrefs.iter().map(String::as_str).collect();
    Mock::given(method("GET"))
        .and(path("/bola/index"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_with_links(&refs)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/bola/read/\d+$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_html("Gol Menit Akhir", &[]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    let mut config = test_config(vec![TopicSpec::new(
        "Bola",
        format!("{}/bola/index", mock_server.uri()),
    )]);
    config.crawler.article_concurrency = 1;

    let (tx, rx) = watch::channel(false);
    let coordinator = CrawlCoordinator::from_config(&config, rx).unwrap();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let _ = tx.send(true);
    });

    let report = tokio::time::timeout(Duration::from_secs(5), coordinator.run_all(&config.topics))
        .await
        .expect("crawl should stop promptly after shutdown");

    assert!(report.interrupted);
    assert!(report.total_articles < 10);
}

#[tokio::test]
async fn test_shutdown_before_start_makes_no_requests() {
    let mock_server = MockServer::start().await;
    let topic = mount_topic(&mock_server, "Tekno", "tekno", 3).await;
    let config = test_config(vec![topic]);

    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    let report = CrawlCoordinator::from_config(&config, rx)
        .unwrap()
        .run_all(&config.topics)
        .await;

    assert!(report.interrupted);
    assert!(report.topics.is_empty());
    assert_eq!(report.summaries.len(), 1);
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}
