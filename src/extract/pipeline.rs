//! Page text to insight candidates
//!
//! Runs each page through cleanup, sentence splitting, candidate filtering,
//! adjacent merging, and atomic re-splitting, then deduplicates across all
//! pages and scores the survivors.

use crate::config::ExtractConfig;
use crate::extract::clean::clean_text;
use crate::extract::dedup::{exact_dedupe, fuzzy_dedupe};
use crate::extract::lexicon::DATE_TOKEN;
use crate::extract::minhash::MinHasher;
use crate::extract::scoring::{candidate_type, investor_signals, quality};
use crate::extract::sentences::{
    atomic_split, extract_section, is_candidate, merge_adjacent, split_sentences,
};
use crate::output::{read_pages, JsonlWriter, PageInput};
use crate::records::{InsightCandidate, Provenance};
use crate::MinerError;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

const TOP_TOKEN_COUNT: usize = 12;

static FREQUENCY_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9]{3,}").expect("valid regex"));

/// A candidate before scoring
#[derive(Debug, Clone, PartialEq)]
pub struct RawCandidate {
    pub source_url: String,
    pub section: String,
    pub text: String,
    pub evidence: Vec<String>,
}

impl AsRef<str> for RawCandidate {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl RawCandidate {
    /// Scores and types this candidate
    pub fn into_insight(self) -> InsightCandidate {
        InsightCandidate {
            candidate_type: candidate_type(&self.text),
            quality_score: quality(&self.text, &self.evidence),
            investor_signals: investor_signals(&self.text),
            provenance: Provenance::Scraped,
            source_url: self.source_url,
            section: self.section,
            text: self.text,
            evidence: self.evidence,
        }
    }
}

/// Counters describing one extraction run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionSummary {
    pub pages: usize,
    pub raw_candidates: usize,
    pub too_short: usize,
    pub exact_removed: usize,
    pub fuzzy_removed: usize,
    pub minhash_removed: usize,
    pub deduped: usize,
    pub written: usize,
    pub date_tokens: usize,
    /// Most frequent tokens of three or more characters, with counts
    pub top_tokens: Vec<(String, usize)>,
}

/// Candidates from a single page, before any cross-page deduplication
pub fn page_candidates(page: &PageInput, config: &ExtractConfig) -> Vec<RawCandidate> {
    let Some(url) = page.url() else {
        return Vec::new();
    };
    let section = extract_section(url, config.section);

    let cleaned = clean_text(page.text());
    let filtered: Vec<String> = split_sentences(&cleaned)
        .into_iter()
        .filter(|s| is_candidate(s, config.baseline_neutral_len))
        .collect();

    let mut candidates = Vec::new();
    for (text, evidence) in merge_adjacent(&filtered) {
        for atom in atomic_split(&text, config.max_atomic_len) {
            if atom.chars().count() > config.max_candidate_len {
                debug!("Discarding over-long candidate from {}", url);
                continue;
            }
            candidates.push(RawCandidate {
                source_url: url.to_string(),
                section: section.clone(),
                text: atom,
                evidence: evidence.clone(),
            });
        }
    }
    candidates
}

fn top_tokens(frequencies: FxHashMap<String, usize>) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = frequencies.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(TOP_TOKEN_COUNT);
    ranked
}

/// Extracts scored, deduplicated candidates from a batch of pages
///
/// Output order follows page order, then sentence order within a page.
pub fn extract_from_pages(
    pages: &[PageInput],
    config: &ExtractConfig,
) -> (Vec<InsightCandidate>, ExtractionSummary) {
    let mut summary = ExtractionSummary {
        pages: pages.len(),
        ..Default::default()
    };
    let mut frequencies: FxHashMap<String, usize> = FxHashMap::default();

    let mut raw = Vec::new();
    for page in pages {
        for candidate in page_candidates(page, config) {
            let lowered = candidate.text.to_lowercase();
            for token in FREQUENCY_TOKEN.find_iter(&lowered) {
                *frequencies.entry(token.as_str().to_string()).or_insert(0) += 1;
            }
            summary.date_tokens += DATE_TOKEN.find_iter(&candidate.text).count();
            raw.push(candidate);
        }
    }
    summary.raw_candidates = raw.len();

    let long_enough: Vec<RawCandidate> = raw
        .into_iter()
        .filter(|c| c.text.chars().count() >= config.min_len)
        .collect();
    summary.too_short = summary.raw_candidates - long_enough.len();

    let before = long_enough.len();
    let mut deduped = exact_dedupe(long_enough);
    summary.exact_removed = before - deduped.len();

    if config.fuzzy_dedupe {
        let before = deduped.len();
        deduped = fuzzy_dedupe(deduped, config.fuzzy_threshold);
        summary.fuzzy_removed = before - deduped.len();
    }

    if config.minhash_dedupe {
        let before = deduped.len();
        deduped = MinHasher::new(&config.minhash).dedupe(deduped);
        summary.minhash_removed = before - deduped.len();
    }
    summary.deduped = deduped.len();

    let insights: Vec<InsightCandidate> = deduped
        .into_iter()
        .take(config.max_insights)
        .map(RawCandidate::into_insight)
        .collect();
    summary.written = insights.len();
    summary.top_tokens = top_tokens(frequencies);

    (insights, summary)
}

/// Reads pages from `pages_path`, extracts candidates, and writes them to `out_path`
pub fn extract_insights(
    pages_path: &Path,
    out_path: &Path,
    config: &ExtractConfig,
) -> Result<ExtractionSummary, MinerError> {
    let pages = read_pages(pages_path)?;
    info!("Extracting insights from {} pages", pages.len());

    let (insights, summary) = extract_from_pages(&pages, config);

    let mut writer = JsonlWriter::create(out_path)?;
    for insight in &insights {
        writer.write(insight)?;
    }
    writer.finish()?;

    if summary.written < config.min_insights {
        warn!(
            "Only {} candidates extracted (target at least {})",
            summary.written, config.min_insights
        );
    }
    info!(
        "Extraction complete: {} raw, {} after dedupe, {} written",
        summary.raw_candidates, summary.deduped, summary.written
    );

    Ok(summary)
}
