//! Link extraction for the crawl frontier
//!
//! Collects anchors from a fetched page, resolves them against the page URL,
//! and keeps the in-scope ones in a stable order.

use crate::url::{normalize, Scope};
use scraper::{Html, Selector};
use std::collections::BTreeSet;

/// Href prefixes that never lead to a crawlable page
const BLOCKED_SCHEMES: &[&str] = &["mailto:", "tel:", "javascript:"];

/// Extracts crawlable links from an HTML page
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document
///
/// **Exclude:**
/// - Empty hrefs
/// - `mailto:`, `tel:`, `javascript:` links
/// - Links that do not resolve to an http(s) URL
/// - Links outside `scope`
///
/// The result is normalized, deduplicated, sorted, and truncated to `cap`.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The page URL relative links are resolved against
/// * `scope` - The crawl scope
/// * `cap` - Maximum number of links returned
///
/// # Example
///
/// ```
/// use insight_miner::crawler::extract_links;
/// use insight_miner::url::Scope;
///
/// let scope = Scope::new("https://example.com/", &[]).unwrap();
/// let html = r#"<a href="/b">B</a><a href="/a#top">A</a><a href="https://other.org/">X</a>"#;
/// let links = extract_links(html, "https://example.com/", &scope, 10);
/// assert_eq!(links, vec!["https://example.com/a", "https://example.com/b"]);
/// ```
pub fn extract_links(html: &str, base_url: &str, scope: &Scope, cap: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut links = BTreeSet::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if let Some(link) = resolve_link(href, base_url, scope) {
            links.insert(link);
        }
    }

    links.into_iter().take(cap).collect()
}

/// Resolves a link href to an absolute in-scope URL
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &str, scope: &Scope) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if BLOCKED_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
        return None;
    }

    match normalize(base_url, href) {
        Ok(absolute) if scope.contains_str(&absolute) => Some(absolute),
        Ok(absolute) => {
            tracing::trace!("Dropping off-scope link {}", absolute);
            None
        }
        Err(e) => {
            tracing::trace!("Dropping link {}: {}", href, e);
            None
        }
    }
}
