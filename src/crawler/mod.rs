//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Global request pacing
//! - Boilerplate stripping and link extraction
//! - Overall crawl coordination

mod boilerplate;
mod coordinator;
mod fetcher;
mod links;
mod pacer;

pub use boilerplate::extract_title_and_text;
pub use coordinator::{run_crawl, Coordinator, CrawlHandle};
pub use fetcher::{build_http_client, is_html, FetchResult, Fetcher};
pub use links::extract_links;
pub use pacer::Pacer;
