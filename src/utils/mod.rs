//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;

use regex::Regex;
use std::sync::OnceLock;

/// Collapse every run of whitespace (including newlines) into one space and trim
pub fn normalize_whitespace(text: &str) -> String {
    static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

    let re = WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

    re.replace_all(text.trim(), " ").to_string()
}

/// Truncate text to at most `max_chars` characters, never splitting a code point
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Shorten a URL for progress lines
pub fn truncate_url(url: &str, max_len: usize) -> &str {
    match url.char_indices().nth(max_len) {
        Some((byte_idx, _)) => &url[..byte_idx],
        None => url,
    }
}
