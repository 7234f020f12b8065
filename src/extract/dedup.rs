//! Exact and Jaccard-based near-duplicate removal
//!
//! All passes keep the first occurrence and preserve input order.

use regex::Regex;
use rustc_hash::FxHashSet;
use std::sync::LazyLock;

const STOP_WORDS: &[&str] = &["the", "and", "for", "to", "of", "a", "an", "in"];

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z0-9]+").expect("valid regex"));

/// Dedupe key: lowercase, non-alphanumerics to spaces, whitespace collapsed
pub fn normalize_for_dedupe(text: &str) -> String {
    let mapped: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { ' ' })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drops items whose normalized text was already seen
pub fn exact_dedupe<T: AsRef<str>>(items: Vec<T>) -> Vec<T> {
    let mut seen = FxHashSet::default();
    items
        .into_iter()
        .filter(|item| seen.insert(normalize_for_dedupe(item.as_ref())))
        .collect()
}

/// Token set used for similarity: stop words removed, naive plural strip
pub fn similarity_tokens(text: &str) -> FxHashSet<String> {
    let lowered = text.to_lowercase();
    TOKEN
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !STOP_WORDS.contains(token))
        .map(|token| match token.strip_suffix('s') {
            Some(stem) if token.len() > 3 => stem.to_string(),
            _ => token.to_string(),
        })
        .collect()
}

/// Jaccard similarity of two token sets; zero when either is empty
pub fn jaccard_sets(a: &FxHashSet<String>, b: &FxHashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Jaccard similarity of two texts over their similarity tokens
pub fn jaccard(a: &str, b: &str) -> f64 {
    jaccard_sets(&similarity_tokens(a), &similarity_tokens(b))
}

/// Drops items at least `threshold` similar to any already kept item
pub fn fuzzy_dedupe<T: AsRef<str>>(items: Vec<T>, threshold: f64) -> Vec<T> {
    let mut kept: Vec<T> = Vec::with_capacity(items.len());
    let mut kept_tokens: Vec<FxHashSet<String>> = Vec::with_capacity(items.len());

    for item in items {
        let tokens = similarity_tokens(item.as_ref());
        if kept_tokens
            .iter()
            .any(|other| jaccard_sets(&tokens, other) >= threshold)
        {
            continue;
        }
        kept_tokens.push(tokens);
        kept.push(item);
    }

    kept
}
