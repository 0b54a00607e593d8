//! Article link discovery on listing pages
//!
//! Listing markup differs between Kompas sections, so discovery walks
//! [`LINK_RULES`] in priority order and keeps the links of the first rule
//! that produces at least one usable URL.

use std::collections::HashSet;

use scraper::Html;
use url::Url;

use crate::parser::selectors::LINK_RULES;

/// Links found on one listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredLinks {
    /// Absolute http(s) URLs, deduplicated, in document order
    pub links: Vec<String>,
    /// Name of the rule that produced the links, `None` when nothing matched
    pub rule: Option<&'static str>,
}

impl DiscoveredLinks {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Finds candidate article links on a listing page
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkDiscoverer;

impl LinkDiscoverer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Discover article links in a listing document
    ///
    /// Never fails: unusable hrefs are skipped and an empty result means no
    /// rule matched.
    pub fn discover(&self, document: &Html, base_url: &Url) -> DiscoveredLinks {
        for rule in LINK_RULES.iter() {
            let mut seen = HashSet::new();
            let links: Vec<String> = document
                .select(&rule.selector)
                .filter_map(|el| el.value().attr("href"))
                .filter_map(|href| resolve_link(href, base_url))
                .filter(|link| seen.insert(link.clone()))
                .collect();

            if !links.is_empty() {
                return DiscoveredLinks {
                    links,
                    rule: Some(rule.name),
                };
            }
        }

        DiscoveredLinks::default()
    }

    /// Parse raw listing HTML and discover links in it
    pub fn discover_html(&self, html: &str, base_url: &Url) -> DiscoveredLinks {
        self.discover(&Html::parse_document(html), base_url)
    }
}

/// Resolve an href against the page URL
///
/// Returns `None` for empty, fragment-only and non-navigational hrefs, for
/// hrefs that fail to resolve, and for anything that is not http(s). The
/// fragment is dropped from the result.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let mut absolute = base_url.join(href).ok()?;
    if !matches!(absolute.scheme(), "http" | "https") {
        return None;
    }
    absolute.set_fragment(None);

    Some(absolute.to_string())
}
