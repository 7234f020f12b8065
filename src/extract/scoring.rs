//! Candidate typing, investor signals, and heuristic quality

use crate::extract::lexicon::{keyword_hits, share_keyword, INVESTOR_SIGNALS, NUMBER_PATTERN, TYPE_RULES};
use crate::records::{CandidateType, InvestorSignal};

const LENGTH_WEIGHT: f64 = 0.35;
const NUMERIC_WEIGHT: f64 = 0.25;
const KEYWORD_WEIGHT: f64 = 0.25;
const COHERENCE_WEIGHT: f64 = 0.15;

/// First matching category in priority order, or `Other`
pub fn candidate_type(text: &str) -> CandidateType {
    TYPE_RULES
        .iter()
        .find(|(_, pattern)| pattern.is_match(text))
        .map(|(kind, _)| *kind)
        .unwrap_or(CandidateType::Other)
}

/// Every investor signal whose pattern matches, sorted
pub fn investor_signals(text: &str) -> Vec<InvestorSignal> {
    let mut signals: Vec<InvestorSignal> = INVESTOR_SIGNALS
        .iter()
        .filter(|(_, pattern)| pattern.is_match(text))
        .map(|(signal, _)| *signal)
        .collect();
    signals.sort();
    signals.dedup();
    signals
}

fn length_score(len: usize) -> f64 {
    match len {
        60..=220 => 1.0,
        40..=59 | 221..=280 => 0.6,
        _ => 0.3,
    }
}

fn coherence_score(evidence: &[String]) -> f64 {
    match evidence {
        [] | [_] => 0.8,
        [first, .., last] if share_keyword(first, last) => 1.0,
        _ => 0.5,
    }
}

/// Heuristic quality of a candidate in [0, 1], rounded to three decimals
///
/// Weighted blend of length fit, numeric density, domain keyword density,
/// and evidence coherence.
pub fn quality(text: &str, evidence: &[String]) -> f64 {
    let length = length_score(text.chars().count());
    let numeric = (NUMBER_PATTERN.find_iter(text).count() as f64 / 3.0).min(1.0);
    let keyword = (keyword_hits(text) as f64 / 5.0).min(1.0);
    let coherence = coherence_score(evidence);

    let raw = LENGTH_WEIGHT * length
        + NUMERIC_WEIGHT * numeric
        + KEYWORD_WEIGHT * keyword
        + COHERENCE_WEIGHT * coherence;

    (raw.clamp(0.0, 1.0) * 1000.0).round() / 1000.0
}
