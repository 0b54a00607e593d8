//! JSON report output
//!
//! The artifact is one UTF-8 JSON array of `{"topic", "documents"}` objects,
//! one per topic that produced documents, in configured order. It is written
//! to a temporary file next to the target and renamed over it, so a reader
//! never sees a half-written report.

use std::path::{Path, PathBuf};

use crate::config::OutputConfig;
use crate::error::Result;
use crate::models::{CrawlReport, TopicResult};

/// Writes crawl reports to disk
#[derive(Debug, Clone)]
pub struct ReportWriter {
    path: PathBuf,
    pretty: bool,
}

impl ReportWriter {
    pub fn new(path: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            path: path.into(),
            pretty,
        }
    }

    #[must_use]
    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(&config.path, config.pretty)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize the report topics
    ///
    /// Non-ASCII text is kept as-is rather than escaped.
    pub fn render(&self, topics: &[TopicResult]) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(topics)?
        } else {
            serde_json::to_string(topics)?
        };
        Ok(json)
    }

    /// Write the report atomically and return the final path
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the directory, temp file or rename fails, and
    /// `Error::Json` if serialization fails.
    pub async fn write(&self, report: &CrawlReport) -> Result<PathBuf> {
        let json = self.render(&report.topics)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = temp_path_for(&self.path);
        tokio::fs::write(&temp_path, json.as_bytes()).await?;

        // Atomic rename
        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::info!(
            path = %self.path.display(),
            topics = report.topics.len(),
            total_articles = report.total_articles,
            "Report written"
        );
        Ok(self.path.clone())
    }
}

/// Read a previously written report
pub async fn read_report(path: &Path) -> Result<Vec<TopicResult>> {
    let text = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&text)?)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "report.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
