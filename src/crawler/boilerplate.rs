//! Boilerplate removal for fetched pages
//!
//! Turns raw HTML into a `(title, text)` pair: page chrome such as
//! navigation, headers, footers, cookie banners, and modals is dropped and
//! the remaining visible text is flattened into single-spaced prose.

use scraper::{ElementRef, Html, Node, Selector};

/// Elements dropped together with their subtree
const BLOCKED_TAGS: &[&str] = &[
    "head", "script", "style", "noscript", "template", "header", "nav", "footer", "aside",
];

/// ARIA roles marking site chrome
const BLOCKED_ROLES: &[&str] = &["navigation", "banner", "contentinfo"];

/// Class names marking overlays and decorative regions
const BLOCKED_CLASSES: &[&str] = &["cookie", "cookies", "banner", "modal", "sidebar", "hero"];

/// Maximum title length in characters
pub const MAX_TITLE_CHARS: usize = 300;

fn is_blocked(element: &ElementRef<'_>) -> bool {
    let el = element.value();
    if BLOCKED_TAGS.contains(&el.name()) {
        return true;
    }
    if let Some(role) = el.attr("role") {
        if BLOCKED_ROLES.contains(&role.trim().to_ascii_lowercase().as_str()) {
            return true;
        }
    }
    el.classes().any(|class| BLOCKED_CLASSES.contains(&class))
}

/// Extracts the trimmed `<title>`, truncated to [`MAX_TITLE_CHARS`]
fn extract_title(document: &Html) -> String {
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };
    document
        .select(&selector)
        .next()
        .map(|el| {
            el.text()
                .collect::<String>()
                .trim()
                .chars()
                .take(MAX_TITLE_CHARS)
                .collect()
        })
        .unwrap_or_default()
}

/// Collects the visible text outside blocked regions, in document order
fn extract_text(document: &Html) -> String {
    let mut fragments: Vec<&str> = Vec::new();
    let mut stack = vec![*document.root_element()];

    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    fragments.push(trimmed);
                }
            }
            Node::Element(_) => {
                let Some(element) = ElementRef::wrap(node) else {
                    continue;
                };
                if is_blocked(&element) {
                    continue;
                }
                let children: Vec<_> = node.children().collect();
                stack.extend(children.into_iter().rev());
            }
            _ => {}
        }
    }

    fragments
        .iter()
        .flat_map(|fragment| fragment.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strips boilerplate from an HTML document
///
/// # Returns
///
/// `(title, text)` where `text` has all whitespace runs collapsed to a
/// single space.
///
/// # Example
///
/// ```
/// use insight_miner::crawler::extract_title_and_text;
///
/// let html = "<html><head><title> Docs </title></head>\
///             <body><nav>Menu</nav><p>Staking   rewards</p></body></html>";
/// let (title, text) = extract_title_and_text(html);
/// assert_eq!(title, "Docs");
/// assert_eq!(text, "Staking rewards");
/// ```
pub fn extract_title_and_text(html: &str) -> (String, String) {
    let document = Html::parse_document(html);
    (extract_title(&document), extract_text(&document))
}
