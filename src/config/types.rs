use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default User-Agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "InsightMinerBot/0.1 (+https://example.com/bot)";

/// Top-level configuration file
///
/// Both tables are optional so the same file can drive either subcommand.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub crawl: Option<CrawlConfig>,
    #[serde(default)]
    pub extract: ExtractConfig,
}

/// Crawl behavior configuration, immutable for the duration of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlConfig {
    /// Seed URL; its host defines the crawl scope
    pub seed: String,

    /// Maximum BFS depth (seed = 0)
    pub max_depth: u32,

    /// Maximum number of page records to emit
    pub max_pages: usize,

    /// Requests per second across the whole crawl
    pub rps: f64,

    /// Maximum in-scope links considered per page
    pub per_page_link_cap: usize,

    pub user_agent: String,

    /// Per-request timeout (seconds)
    pub timeout: u64,

    /// Total attempts per page, including the first
    pub retry_attempts: u32,

    /// Initial backoff delay (seconds), doubled per attempt
    pub retry_backoff_base: f64,

    /// Status codes that trigger a retry
    pub retry_statuses: Vec<u16>,

    /// Skip pages whose HTML exceeds this many bytes; `None` or 0 disables
    pub max_html_bytes: Option<usize>,

    /// Skip pages whose stripped text hashes to an already-seen value
    pub enable_content_dedupe: bool,

    /// Treat error or placeholder robots.txt responses as allow-all
    pub robots_fallback_allow: bool,

    /// Additional hostnames (and their subdomains) treated as in scope
    pub extra_scope_hosts: Vec<String>,

    /// Send common browser Accept headers
    pub browser_headers: bool,

    /// Number of robots.txt files kept in the LRU cache
    pub robots_cache_capacity: usize,

    /// Abort the crawl after this many seconds
    pub max_duration: Option<u64>,

    /// Records buffered between the crawler and its consumer
    pub channel_capacity: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed: String::new(),
            max_depth: 2,
            max_pages: 50,
            rps: 1.0,
            per_page_link_cap: 25,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: 15,
            retry_attempts: 3,
            retry_backoff_base: 0.75,
            retry_statuses: vec![429, 500, 502, 503, 504],
            max_html_bytes: Some(800_000),
            enable_content_dedupe: true,
            robots_fallback_allow: false,
            extra_scope_hosts: Vec::new(),
            browser_headers: false,
            robots_cache_capacity: 32,
            max_duration: None,
            channel_capacity: 16,
        }
    }
}

impl CrawlConfig {
    /// Creates a configuration with defaults for the given seed
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            ..Self::default()
        }
    }

    /// Minimum interval between the end of one fetch and the start of the next
    pub fn min_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.rps.max(1e-6))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Delay before retry number `attempt` (counted from 0)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2f64.powi(attempt.min(30) as i32);
        Duration::try_from_secs_f64((self.retry_backoff_base * factor).max(0.0))
            .unwrap_or(Duration::MAX)
    }

    pub fn is_retryable(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Effective HTML size limit
    pub fn html_size_limit(&self) -> Option<usize> {
        self.max_html_bytes.filter(|&limit| limit > 0)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.max_duration.map(Duration::from_secs)
    }
}

/// How the `section` field of a candidate is derived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SectionStrategy {
    /// First URL path segment
    #[default]
    Path,
    /// Flat `general` section
    #[serde(rename = "none")]
    #[value(name = "none")]
    Flat,
}

/// MinHash/LSH parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MinHashConfig {
    pub signature_size: usize,
    pub bands: usize,
    pub shingle_k: usize,
    pub confirm_threshold: f64,
}

impl Default for MinHashConfig {
    fn default() -> Self {
        Self {
            signature_size: 32,
            bands: 8,
            shingle_k: 5,
            confirm_threshold: 0.85,
        }
    }
}

impl MinHashConfig {
    pub fn rows_per_band(&self) -> usize {
        self.signature_size / self.bands.max(1)
    }
}

/// Extraction and deduplication configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ExtractConfig {
    /// Advisory lower bound on emitted candidates; never enforced
    pub min_insights: usize,

    /// Hard cap on emitted candidates
    pub max_insights: usize,

    /// Candidates shorter than this are dropped
    pub min_len: usize,

    pub fuzzy_dedupe: bool,
    pub fuzzy_threshold: f64,

    pub minhash_dedupe: bool,
    pub minhash: MinHashConfig,

    /// Sentences at least this long are candidates even without keywords
    pub baseline_neutral_len: usize,

    pub section: SectionStrategy,

    /// Merged texts longer than this are re-split on clause boundaries
    pub max_atomic_len: usize,

    /// Guardrail: candidates longer than this are discarded
    pub max_candidate_len: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_insights: 50,
            max_insights: 100,
            min_len: 25,
            fuzzy_dedupe: false,
            fuzzy_threshold: 0.9,
            minhash_dedupe: false,
            minhash: MinHashConfig::default(),
            baseline_neutral_len: 40,
            section: SectionStrategy::Path,
            max_atomic_len: 180,
            max_candidate_len: 300,
        }
    }
}
