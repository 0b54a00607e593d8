//! Article field extraction with selector fallback chains
//!
//! Turns a parsed article page into an [`ArticleRecord`]. Only a missing
//! title is an error; timestamp and content degrade to empty strings.

use scraper::{ElementRef, Html};

use crate::config::CrawlerConfig;
use crate::models::ArticleRecord;
use crate::parser::sanitize::{has_content, sanitize_text};
use crate::parser::selectors::{CONTENT_RULES, PARAGRAPH, TIMESTAMP_RULES, TITLE_RULES};
use crate::utils::error::ExtractError;
use crate::utils::truncate_chars;

/// Default minimum paragraph length; shorter paragraphs are captions and boilerplate
pub const DEFAULT_MIN_PARAGRAPH_CHARS: usize = 21;

/// Article extractor for Kompas article pages
///
/// Stateless apart from its thresholds, so one instance can be shared by every
/// topic crawler.
#[derive(Debug, Clone)]
pub struct ArticleExtractor {
    min_paragraph_chars: usize,
    max_content_chars: Option<usize>,
}

impl ArticleExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_paragraph_chars: DEFAULT_MIN_PARAGRAPH_CHARS,
            max_content_chars: None,
        }
    }

    /// Build an extractor with the thresholds from the crawler configuration
    #[must_use]
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            min_paragraph_chars: config.min_paragraph_chars,
            max_content_chars: config.max_content_chars,
        }
    }

    #[must_use]
    pub fn with_min_paragraph_chars(mut self, min: usize) -> Self {
        self.min_paragraph_chars = min;
        self
    }

    #[must_use]
    pub fn with_max_content_chars(mut self, max: Option<usize>) -> Self {
        self.max_content_chars = max;
        self
    }

    /// Extract title, timestamp and body text from an article document
    ///
    /// # Errors
    /// Returns `ExtractError::NoTitle` if no title rule yields non-empty text.
    pub fn extract(&self, document: &Html) -> Result<ArticleRecord, ExtractError> {
        let title = self.extract_title(document).ok_or(ExtractError::NoTitle)?;
        let timestamp = self.extract_timestamp(document).unwrap_or_default();
        let content = self.extract_content(document);

        Ok(ArticleRecord {
            title,
            timestamp,
            content,
        })
    }

    /// Parse raw HTML and extract from it
    ///
    /// # Errors
    /// Same as [`ArticleExtractor::extract`].
    pub fn extract_html(&self, html: &str) -> Result<ArticleRecord, ExtractError> {
        let document = Html::parse_document(html);
        self.extract(&document)
    }

    fn extract_title(&self, document: &Html) -> Option<String> {
        TITLE_RULES.iter().find_map(|selector| {
            document
                .select(selector)
                .map(|el| element_text(&el))
                .find(|text| has_content(text))
        })
    }

    fn extract_timestamp(&self, document: &Html) -> Option<String> {
        TIMESTAMP_RULES.iter().find_map(|rule| {
            document.select(&rule.selector).find_map(|element| {
                let from_attr = rule
                    .attribute
                    .and_then(|name| element.value().attr(name))
                    .map(sanitize_text)
                    .filter(|value| has_content(value));

                let value = from_attr.unwrap_or_else(|| element_text(&element));
                has_content(&value).then_some(value)
            })
        })
    }

    /// Paragraphs of the first content container present, joined by single spaces
    fn extract_content(&self, document: &Html) -> String {
        let Some(container) = CONTENT_RULES
            .iter()
            .find_map(|selector| document.select(selector).next())
        else {
            return String::new();
        };

        let content = container
            .select(&PARAGRAPH)
            .map(|p| element_text(&p))
            .filter(|text| text.chars().count() >= self.min_paragraph_chars)
            .collect::<Vec<_>>()
            .join(" ");

        match self.max_content_chars {
            Some(max) => truncate_chars(&content, max),
            None => content,
        }
    }
}

impl Default for ArticleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn element_text(element: &ElementRef<'_>) -> String {
    sanitize_text(&element.text().collect::<String>())
}
