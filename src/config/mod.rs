//! Configuration module for Insight-Miner
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A file may contain a `[crawl]` table, an `[extract]` table, or both.
//!
//! # Example
//!
//! ```no_run
//! use insight_miner::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("miner.toml")).unwrap();
//! if let Some(crawl) = &config.crawl {
//!     println!("Crawler will use max depth: {}", crawl.max_depth);
//! }
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, ExtractConfig, MinHashConfig, SectionStrategy, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, validate_crawl, validate_extract};
