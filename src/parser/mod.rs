//! HTML parsing and data extraction
//!
//! This module turns Kompas article pages into structured records. Listing
//! pages are handled by [`crate::crawler::discover`], which shares the rule
//! tables in [`selectors`].

pub mod html;
pub mod sanitize;
pub mod selectors;

pub use html::{ArticleExtractor, DEFAULT_MIN_PARAGRAPH_CHARS};
