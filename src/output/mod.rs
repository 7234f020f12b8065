//! Output module for crawl statistics and JSON Lines files
//!
//! This module handles:
//! - Recording and printing crawl statistics
//! - Writing page records and insight candidates as JSON Lines
//! - Reading page records back for extraction

pub mod jsonl;
pub mod stats;

pub use jsonl::{read_jsonl, read_pages, write_jsonl, JsonlWriter, PageInput};
pub use stats::{print_statistics, CrawlStats};
