//! Insight-Miner: polite site ingestion for insight extraction
//!
//! This crate crawls a single site breadth-first while respecting robots.txt
//! and a global rate limit, strips page boilerplate, and turns the resulting
//! page text into deduplicated, scored insight candidates.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod records;
pub mod robots;
pub mod url;

use thiserror::Error;

/// Main error type for Insight-Miner operations
#[derive(Debug, Error)]
pub enum MinerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Crawl task failed: {0}")]
    Task(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Insight-Miner operations
pub type Result<T> = std::result::Result<T, MinerError>;

// Re-export commonly used types
pub use config::{CrawlConfig, ExtractConfig};
pub use crawler::{Coordinator, CrawlHandle};
pub use output::CrawlStats;
pub use records::{CandidateType, InsightCandidate, InvestorSignal, PageRecord};
pub use url::{canonicalize, in_scope, normalize, Scope};
