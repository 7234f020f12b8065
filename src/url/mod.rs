//! URL handling module for Insight-Miner
//!
//! This module provides link resolution and normalization, canonical URLs
//! for de-duplication, and crawl scope checks.

mod normalize;
mod scope;

// Re-export main functions
pub use normalize::{canonical_url, canonicalize, normalize};
pub use scope::{extract_host, in_scope, Scope};
