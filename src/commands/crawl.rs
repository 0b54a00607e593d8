use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::sync::watch;

use kabar::config::Config;
use kabar::crawler::CrawlCoordinator;
use kabar::metrics;
use kabar::models::CrawlReport;
use kabar::storage::ReportWriter;

pub async fn crawl(
    mut config: Config,
    output: Option<PathBuf>,
    metrics_out: Option<PathBuf>,
) -> Result<()> {
    if let Some(output) = output {
        config.output.path = output;
    }
    config.validate().context("Invalid configuration")?;

    if let Err(e) = metrics::init_metrics() {
        tracing::warn!(error = %e, "Metrics initialization failed, continuing without metrics");
    }

    println!("Starting Kompas Topic Crawl");
    println!("===========================");
    println!("Topics: {}", config.topics.len());
    println!("Quota per topic: {}", config.crawler.quota_per_topic);
    println!("Output: {}", config.output.path.display());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after in-flight work is dropped");
            let _ = shutdown_tx.send(true);
        }
    });

    let coordinator = CrawlCoordinator::from_config(&config, shutdown_rx)
        .context("Failed to create HTTP client")?;
    let report = coordinator.run_all(&config.topics).await;

    let path = ReportWriter::from_config(&config.output)
        .write(&report)
        .await
        .with_context(|| format!("Failed to write report: {}", config.output.path.display()))?;

    print_summary(&report, &path);

    if let Some(metrics_path) = metrics_out {
        write_metrics(&metrics_path).await?;
        println!("Metrics: {}", metrics_path.display());
    }

    Ok(())
}

/// Validate the configuration and print the topics that would be crawled
pub fn topics(config: &Config) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    println!("Configured Topics");
    println!("=================");
    for (i, topic) in config.topics.iter().enumerate() {
        println!("{:>2}. {:<12} {}", i + 1, topic.name, topic.listing_url);
    }
    println!();
    println!(
        "quota {} / max pages {} / article delay {}ms / topic delay {}ms",
        config.crawler.quota_per_topic,
        config.crawler.max_pages,
        config.crawler.article_delay_ms,
        config.crawler.topic_delay_ms
    );

    Ok(())
}

fn print_summary(report: &CrawlReport, path: &Path) {
    let stats = report.stats();

    println!("\nCrawl Summary");
    println!("=============");
    println!(
        "Started:  {}",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "Finished: {}",
        report.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if report.interrupted {
        println!("Status:   interrupted (partial results)");
    }
    println!();
    println!(
        "{:<12} {:>5} {:>6} {:>6} {:>7} {:>8}",
        "topic", "docs", "pages", "links", "fetch!", "extract!"
    );
    println!("{}", "-".repeat(49));
    for summary in &report.summaries {
        let mut flags = Vec::new();
        if summary.listing_failed {
            flags.push("listing failed");
        }
        if summary.aborted {
            flags.push("aborted");
        }
        println!(
            "{:<12} {:>5} {:>6} {:>6} {:>7} {:>8} {}",
            summary.topic,
            summary.documents,
            summary.pages_fetched,
            summary.links_discovered,
            summary.fetch_failures,
            summary.extraction_failures,
            flags.join(", ")
        );
    }
    println!("{}", "-".repeat(49));
    println!("Total articles: {}", report.total_articles);
    println!(
        "Topics with documents: {}/{}",
        stats.topics_with_documents, stats.topics_configured
    );
    println!("Failure rate: {:.1}%", stats.failure_rate());
    println!("Crawl rate: {:.1} articles/min", stats.crawl_rate());
    println!("Output: {}", path.display());
}

async fn write_metrics(path: &Path) -> Result<()> {
    let text = metrics::encode_metrics()
        .map_err(|e| anyhow::anyhow!("Failed to encode metrics: {e}"))?;
    tokio::fs::write(path, text)
        .await
        .with_context(|| format!("Failed to write metrics file: {}", path.display()))?;
    Ok(())
}
