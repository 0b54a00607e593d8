//! CSS selector rule tables for Kompas listing and article pages
//!
//! Every chain is an ordered fallback list: callers try rules in order and the
//! first rule that yields something usable wins. Rules are never merged.

use lazy_static::lazy_static;
use scraper::Selector;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

/// A named selector inside a fallback chain
pub struct Rule {
    /// Selector source text, reported in logs when the rule wins
    pub name: &'static str,
    pub selector: Selector,
}

impl Rule {
    fn new(name: &'static str, selector: Selector) -> Self {
        Self { name, selector }
    }
}

/// A timestamp rule may prefer an attribute over element text
pub struct TimestampRule {
    pub selector: Selector,
    pub attribute: Option<&'static str>,
}

lazy_static! {
    /// Listing page anchors, most specific first
    pub static ref LINK_RULES: Vec<Rule> = vec![
        Rule::new("a.article__link", parse_selector!("a.article__link")),
        Rule::new("h3.article__title a", parse_selector!("h3.article__title a")),
        Rule::new(".latest__link", parse_selector!(".latest__link")),
        Rule::new("a[href*='/read/']", parse_selector!("a[href*='/read/']")),
    ];

    pub static ref TITLE_RULES: Vec<Selector> = vec![
        parse_selector!("h1.read__title"),
        parse_selector!("h1"),
    ];

    pub static ref TIMESTAMP_RULES: Vec<TimestampRule> = vec![
        TimestampRule {
            selector: parse_selector!(".read__time"),
            attribute: None,
        },
        TimestampRule {
            selector: parse_selector!("time"),
            attribute: Some("datetime"),
        },
        TimestampRule {
            selector: parse_selector!(".article__date"),
            attribute: None,
        },
    ];

    /// Article body containers; paragraphs are collected from the first one present
    pub static ref CONTENT_RULES: Vec<Selector> = vec![
        parse_selector!(".read__content"),
        parse_selector!("article"),
        parse_selector!(".detail__body"),
    ];

    pub static ref PARAGRAPH: Selector = parse_selector!("p");
}
