//! Sentence splitting, candidacy, merging, and atomic re-splitting

use crate::config::SectionStrategy;
use crate::extract::lexicon::{has_keyword, share_keyword, FLUFF_PATTERN, NUMBER_PATTERN};
use regex::Regex;
use std::sync::LazyLock;

/// Units shorter than this many characters are discarded
const MIN_UNIT_CHARS: usize = 5;

/// A following sentence shorter than this may be merged into its predecessor
const MERGE_MAX_CHARS: usize = 80;

/// Hard wraps only back up to a space past this offset
const WRAP_MIN_OFFSET: usize = 40;

/// Section names are truncated to this many characters
const SECTION_MAX_CHARS: usize = 40;

static CLAUSE_DELIMITERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i);| - |:|\bhowever\b|\bbut\b|\band\b").expect("valid regex")
});

static SECTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^/]+/([^/?#]+)").expect("valid regex"));

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn is_bullet(c: char) -> bool {
    matches!(c, '\u{2022}' | '-' | '\u{2013}')
}

/// Splits text into sentence-like units
///
/// Boundaries are a whitespace run following `.`, `!`, or `?` (the
/// punctuation stays with the sentence) and a bullet or dash marker
/// (`•`, `-`, `–`) followed by one or more spaces (the marker is dropped).
/// Units are trimmed; those under five characters are discarded.
///
/// # Example
///
/// ```
/// use insight_miner::extract::split_sentences;
///
/// let units = split_sentences("Staking is live. Rewards accrue daily! • Audits done - twice");
/// assert_eq!(units, vec!["Staking is live.", "Rewards accrue daily!", "Audits done", "twice"]);
/// ```
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut units = Vec::new();
    let mut start = 0;
    let mut i = 0;

    let mut push = |from: usize, to: usize| {
        let unit = text[from..to].trim();
        if char_len(unit) >= MIN_UNIT_CHARS {
            units.push(unit.to_string());
        }
    };

    while i < chars.len() {
        let (offset, c) = chars[i];
        let prev = if i > 0 { Some(chars[i - 1].1) } else { None };

        if c.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            push(start, offset);
            while i < chars.len() && chars[i].1.is_whitespace() {
                i += 1;
            }
            start = chars.get(i).map_or(text.len(), |(o, _)| *o);
            continue;
        }

        if is_bullet(c) && chars.get(i + 1).is_some_and(|(_, next)| *next == ' ') {
            push(start, offset);
            i += 1;
            while i < chars.len() && chars[i].1 == ' ' {
                i += 1;
            }
            start = chars.get(i).map_or(text.len(), |(o, _)| *o);
            continue;
        }

        i += 1;
    }

    push(start, text.len());
    units
}

/// Decides whether a sentence is worth keeping as an insight candidate
///
/// Fluff never qualifies. Otherwise a sentence qualifies if it contains a
/// number or percentage, contains a domain keyword, or is at least
/// `baseline_len` characters long.
pub fn is_candidate(sentence: &str, baseline_len: usize) -> bool {
    if FLUFF_PATTERN.is_match(sentence) {
        return false;
    }
    NUMBER_PATTERN.is_match(sentence)
        || has_keyword(sentence)
        || char_len(sentence) >= baseline_len
}

/// Merges short follow-up sentences that share a domain keyword
///
/// Returns `(text, evidence)` pairs; evidence lists the original sentences
/// in order. A sentence is merged into at most one predecessor.
pub fn merge_adjacent(candidates: &[String]) -> Vec<(String, Vec<String>)> {
    let mut merged = Vec::with_capacity(candidates.len());
    let mut i = 0;

    while i < candidates.len() {
        let current = &candidates[i];
        let next = candidates.get(i + 1);

        match next {
            Some(next) if char_len(next) < MERGE_MAX_CHARS && share_keyword(current, next) => {
                let text = format!("{}. {}", current.trim_end_matches('.'), next);
                merged.push((text, vec![current.clone(), next.clone()]));
                i += 2;
            }
            _ => {
                merged.push((current.clone(), vec![current.clone()]));
                i += 1;
            }
        }
    }

    merged
}

/// Splits `chars` into pieces of at most `max_len`, preferring spaces
fn hard_wrap(chars: &[char], max_len: usize, out: &mut Vec<String>) {
    let mut start = 0;
    while start < chars.len() {
        let mut end = (start + max_len).min(chars.len());
        if end < chars.len() {
            if let Some(space) = chars[start..end].iter().rposition(|&c| c == ' ') {
                if space > WRAP_MIN_OFFSET {
                    end = start + space;
                }
            }
        }
        let piece: String = chars[start..end].iter().collect();
        let piece = piece.trim();
        if !piece.is_empty() {
            out.push(piece.to_string());
        }
        start = end;
    }
}

/// Re-splits an over-long text into clause-sized chunks
///
/// Texts within `max_len` characters are returned unchanged (trimmed).
/// Longer texts are split on `;`, ` - `, `:`, and the words `however`,
/// `but`, and `and`; clauses are then packed greedily into chunks joined
/// with `", "`. A single clause longer than `max_len` is hard-wrapped at the
/// last space before the limit. Chunks end with terminal punctuation when a
/// period fits within the limit.
///
/// # Example
///
/// ```
/// use insight_miner::extract::atomic_split;
///
/// let text = "Operators secure the network and earn rewards; delegators share in those rewards";
/// let chunks = atomic_split(text, 50);
/// assert_eq!(chunks, vec!["Operators secure the network, earn rewards.", "delegators share in those rewards."]);
/// ```
pub fn atomic_split(text: &str, max_len: usize) -> Vec<String> {
    let trimmed = text.trim();
    if char_len(trimmed) <= max_len {
        return vec![trimmed.to_string()];
    }

    let normalized = trimmed.replace(['\u{2014}', '\u{2013}'], " - ");
    let parts: Vec<&str> = CLAUSE_DELIMITERS
        .split(&normalized)
        .filter(|p| char_len(p.trim()) > 3)
        .map(|p| p.trim_matches([' ', ',', '.']))
        .collect();

    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();

    for part in parts {
        let candidate = if current.is_empty() {
            part.to_string()
        } else {
            format!("{}, {}", current, part)
        };

        if char_len(&candidate) <= max_len {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            out.push(current.trim_end_matches([' ', ',']).to_string());
        }
        if char_len(part) <= max_len {
            current = part.to_string();
        } else {
            let chars: Vec<char> = part.chars().collect();
            hard_wrap(&chars, max_len, &mut out);
            current.clear();
        }
    }
    if !current.is_empty() {
        out.push(current.trim_end_matches([' ', ',']).to_string());
    }

    let chunks: Vec<String> = out
        .into_iter()
        .map(|chunk| chunk.trim().to_string())
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| {
            let terminated = chunk.ends_with(['.', '!', '?']);
            if !terminated && char_len(&chunk) < max_len {
                format!("{}.", chunk)
            } else {
                chunk
            }
        })
        .collect();

    if chunks.is_empty() {
        vec![trimmed.chars().take(max_len).collect()]
    } else {
        chunks
    }
}

/// Derives the section label for a page URL
///
/// With [`SectionStrategy::Path`] this is the first path segment (at most
/// 40 characters) or `root`; with [`SectionStrategy::Flat`] it is always
/// `general`.
pub fn extract_section(url: &str, strategy: SectionStrategy) -> String {
    match strategy {
        SectionStrategy::Flat => "general".to_string(),
        SectionStrategy::Path => SECTION_PATTERN
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|segment| segment.as_str().chars().take(SECTION_MAX_CHARS).collect())
            .unwrap_or_else(|| "root".to_string()),
    }
}
