//! Crawl counters
//!
//! `CrawlStats` is owned by the caller and mutated in place by the crawl
//! engine. It serializes to a flat JSON object for the CLI `--stats` flag.

use serde::{Deserialize, Serialize};

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    /// Pages emitted as records
    pub fetched_ok: u64,

    /// URLs denied by robots.txt
    pub skipped_robots: u64,

    /// Fetches whose final URL left the crawl scope
    pub skipped_off_scope: u64,

    /// Responses that were not HTML
    pub skipped_non_html: u64,

    /// Fetches abandoned after errors or retries
    pub errors_fetch: u64,

    /// Discovered links already seen
    pub duplicates: u64,

    /// Pages whose stripped text matched an earlier page
    pub duplicates_content: u64,

    /// Bodies over the size limit
    pub skipped_too_large: u64,

    /// Links added to the frontier
    pub enqueued: u64,
}

impl CrawlStats {
    /// Total number of pages that were dequeued and did not produce a record
    pub fn skipped_total(&self) -> u64 {
        self.skipped_robots
            + self.skipped_off_scope
            + self.skipped_non_html
            + self.errors_fetch
            + self.duplicates_content
            + self.skipped_too_large
    }
}

/// Prints statistics to stderr in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStats) {
    eprintln!("=== Crawl Statistics ===\n");

    eprintln!("Pages:");
    eprintln!("  Fetched:            {}", stats.fetched_ok);
    eprintln!("  Enqueued links:     {}", stats.enqueued);
    eprintln!("  Duplicate links:    {}", stats.duplicates);
    eprintln!();

    eprintln!("Skipped:");
    eprintln!("  Robots.txt:         {}", stats.skipped_robots);
    eprintln!("  Off scope:          {}", stats.skipped_off_scope);
    eprintln!("  Non-HTML:           {}", stats.skipped_non_html);
    eprintln!("  Too large:          {}", stats.skipped_too_large);
    eprintln!("  Duplicate content:  {}", stats.duplicates_content);
    eprintln!("  Fetch errors:       {}", stats.errors_fetch);
    eprintln!();

    let attempted = stats.fetched_ok + stats.skipped_total();
    let success_rate = if attempted > 0 {
        (stats.fetched_ok as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };

    eprintln!(
        "Success Rate: {:.1}% ({} / {} pages produced records)",
        success_rate, stats.fetched_ok, attempted
    );
}
