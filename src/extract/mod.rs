//! Insight extraction from crawled page text
//!
//! The stages are pure and synchronous: [`clean_text`] and
//! [`split_sentences`] turn page text into sentence units, the candidate
//! filter and merger shape them into statements, the dedup passes remove
//! repeats, and the scorer attaches a type, investor signals, and a
//! quality score.

pub mod clean;
pub mod dedup;
pub mod lexicon;
pub mod minhash;
pub mod pipeline;
pub mod scoring;
pub mod sentences;

pub use clean::{clean_text, fix_mojibake, is_noise};
pub use dedup::{exact_dedupe, fuzzy_dedupe, jaccard, normalize_for_dedupe};
pub use minhash::{minhash_dedupe, MinHasher};
pub use pipeline::{extract_from_pages, extract_insights, page_candidates, ExtractionSummary, RawCandidate};
pub use scoring::{candidate_type, investor_signals, quality};
pub use sentences::{atomic_split, extract_section, is_candidate, merge_adjacent, split_sentences};
