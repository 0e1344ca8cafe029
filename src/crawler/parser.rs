//! HTML link extraction
//!
//! This module defines the `LinkExtractor` seam and the tree-building
//! implementation. Both extractors share the same rules:
//! - Only `<a href="...">` elements are considered
//! - Input bytes are decoded as UTF-8, silently dropping invalid sequences
//! - `javascript:`, `mailto:`, `tel:` and `data:` hrefs are skipped
//! - Links are resolved against the page URL and stripped of fragments
//! - Only `http` and `https` results are kept
//! - Duplicates are removed, first occurrence wins
//!
//! Extraction never fails: malformed markup yields whatever links could be
//! recovered, possibly none.

use crate::config::ParserStrategy;
use crate::crawler::scanner::StreamingExtractor;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;
use url::Url;

/// Schemes that never lead to a crawlable page
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

static ANCHORS: OnceLock<Option<Selector>> = OnceLock::new();

/// `a[href]`, parsed on first use and shared by every page
fn anchor_selector() -> Option<&'static Selector> {
    ANCHORS
        .get_or_init(|| Selector::parse("a[href]").ok())
        .as_ref()
}

/// Extracts outgoing links from an HTML document
pub trait LinkExtractor: Send + Sync {
    /// Returns absolute, fragment-free http(s) links in document order
    fn extract(&self, html: &[u8], base_url: &str) -> Vec<String>;

    /// Short name used in diagnostics
    fn name(&self) -> &'static str;
}

/// Returns the extractor implementing `strategy`
pub fn extractor_for(strategy: ParserStrategy) -> Box<dyn LinkExtractor> {
    match strategy {
        ParserStrategy::Robust => Box::new(HtmlTreeExtractor),
        ParserStrategy::Fast => Box::new(StreamingExtractor),
    }
}

/// Tolerant extractor backed by a full HTML5 tree builder
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTreeExtractor;

impl LinkExtractor for HtmlTreeExtractor {
    fn extract(&self, html: &[u8], base_url: &str) -> Vec<String> {
        let document = Html::parse_document(&decode_lossy(html));

        let Some(selector) = anchor_selector() else {
            return Vec::new();
        };

        let hrefs = document
            .select(selector)
            .filter_map(|element| element.value().attr("href"));

        resolve_links(hrefs, base_url)
    }

    fn name(&self) -> &'static str {
        "robust"
    }
}

/// Decodes bytes as UTF-8, dropping invalid sequences
pub fn decode_lossy(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

/// Returns false for hrefs that can never be crawled
fn is_navigable(href: &str) -> bool {
    let href = href.trim();
    if href.is_empty() {
        return false;
    }

    let lower = href.to_ascii_lowercase();
    !SKIPPED_SCHEMES
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

/// Resolves raw hrefs against `base_url`
///
/// Applies the shared rules from the module docs. An unparseable base URL
/// yields no links.
pub fn resolve_links<I, S>(hrefs: I, base_url: &str) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let Ok(base) = Url::parse(base_url) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for href in hrefs {
        let href = href.as_ref();
        if !is_navigable(href) {
            continue;
        }

        let Ok(mut absolute) = base.join(href.trim()) else {
            continue;
        };

        if absolute.scheme() != "http" && absolute.scheme() != "https" {
            continue;
        }

        absolute.set_fragment(None);
        let link = absolute.to_string();
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }

    links
}
