//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the breadth-first crawl loop that coordinates:
//! - The FIFO frontier and the seen-set of canonical URLs
//! - Robots.txt checks, pacing, and fetching
//! - Scope, content-type, size, and content-duplicate admission
//! - Link extraction for the next depth level
//!
//! Records are handed to the consumer through a bounded channel, so the crawl
//! never runs ahead of a slow reader.

use crate::config::{validate_crawl, CrawlConfig};
use crate::crawler::boilerplate::extract_title_and_text;
use crate::crawler::fetcher::{build_http_client, FetchResult, Fetcher};
use crate::crawler::links::extract_links;
use crate::crawler::pacer::Pacer;
use crate::output::CrawlStats;
use crate::records::PageRecord;
use crate::robots::RobotsAuthority;
use crate::url::{canonicalize, Scope};
use crate::MinerError;
use sha2::{Digest, Sha256};
use std::collections::{HashSet, VecDeque};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Text beyond this many characters is ignored when hashing page content
const CONTENT_HASH_MAX_CHARS: usize = 200_000;

/// A URL waiting in the frontier
#[derive(Debug, Clone)]
struct QueuedUrl {
    /// Canonical URL to fetch
    url: String,

    /// BFS depth
    depth: u32,

    /// Canonical URL of the page that linked here
    parent: Option<String>,
}

/// Mutable state of one crawl run
struct CrawlState {
    frontier: VecDeque<QueuedUrl>,
    seen: HashSet<String>,
    content_hashes: HashSet<String>,
    fetched: usize,
}

impl CrawlState {
    fn new(seed: &str) -> Self {
        Self {
            frontier: VecDeque::from([QueuedUrl {
                url: seed.to_string(),
                depth: 0,
                parent: None,
            }]),
            seen: HashSet::from([seed.to_string()]),
            content_hashes: HashSet::new(),
            fetched: 0,
        }
    }
}

/// Whether the loop keeps going after a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: CrawlConfig,
    seed: String,
    scope: Scope,
    fetcher: Fetcher,
    robots: RobotsAuthority,
    pacer: Pacer,
    cancel: CancellationToken,
    finished: bool,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(MinerError)` - The configuration or seed URL is invalid, or the
    ///   HTTP client could not be built
    pub fn new(config: CrawlConfig) -> Result<Self, MinerError> {
        validate_crawl(&config)?;

        let seed = canonicalize(&config.seed)?;
        let scope = Scope::new(&seed, &config.extra_scope_hosts)?;
        let client = build_http_client(&config)?;

        let robots = RobotsAuthority::new(client.clone(), config.robots_cache_capacity);
        let fetcher = Fetcher::new(client, &config);
        let pacer = Pacer::new(config.min_interval());

        Ok(Self {
            config,
            seed,
            scope,
            fetcher,
            robots,
            pacer,
            cancel: CancellationToken::new(),
            finished: false,
        })
    }

    /// Uses an external token to cancel the crawl
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Returns a token that cancels this crawl when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The canonical seed URL
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Runs the crawl loop, sending each page record to `records`
    ///
    /// The loop ends when the frontier is empty, `max_pages` records have
    /// been sent, the crawl is cancelled, the deadline passes, or the
    /// receiver is dropped. Page-level failures only bump counters in
    /// `stats`. A coordinator runs once; a second call is an error.
    pub async fn run(
        &mut self,
        stats: &mut CrawlStats,
        records: &mpsc::Sender<PageRecord>,
    ) -> Result<(), MinerError> {
        if self.finished {
            return Err(MinerError::Task("crawl already run".to_string()));
        }
        self.finished = true;

        let stop = self.cancel.child_token();
        let deadline_guard = self.config.deadline().map(|limit| {
            let token = stop.clone();
            tokio::spawn(async move {
                tokio::time::sleep(limit).await;
                tracing::info!("Crawl deadline of {:?} reached", limit);
                token.cancel();
            })
        });

        tracing::info!(
            "Starting crawl of {} (max_depth={}, max_pages={}, rps={})",
            self.seed,
            self.config.max_depth,
            self.config.max_pages,
            self.config.rps
        );

        let start_time = Instant::now();
        let mut state = CrawlState::new(&self.seed);

        loop {
            if state.fetched >= self.config.max_pages {
                tracing::info!("Reached max_pages ({})", self.config.max_pages);
                break;
            }
            if stop.is_cancelled() {
                tracing::info!("Crawl cancelled");
                break;
            }
            let Some(queued) = state.frontier.pop_front() else {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            };

            tracing::debug!("Processing URL: {} (depth {})", queued.url, queued.depth);

            if self
                .process_url(queued, &mut state, stats, records, &stop)
                .await
                == Flow::Stop
            {
                break;
            }
        }

        if let Some(guard) = deadline_guard {
            guard.abort();
        }

        tracing::info!(
            "Crawl completed: {} pages in {:?} ({} skipped, {} still queued)",
            state.fetched,
            start_time.elapsed(),
            stats.skipped_total(),
            state.frontier.len()
        );

        Ok(())
    }

    /// Processes a single URL through robots, fetch, and admission checks
    async fn process_url(
        &mut self,
        queued: QueuedUrl,
        state: &mut CrawlState,
        stats: &mut CrawlStats,
        records: &mpsc::Sender<PageRecord>,
        stop: &CancellationToken,
    ) -> Flow {
        let allowed = tokio::select! {
            _ = stop.cancelled() => return Flow::Stop,
            allowed = self.robots.can_fetch(
                &self.config.user_agent,
                &queued.url,
                self.config.robots_fallback_allow,
            ) => allowed,
        };
        if !allowed {
            tracing::debug!("URL {} disallowed by robots.txt", queued.url);
            stats.skipped_robots += 1;
            return Flow::Continue;
        }

        if !self.pacer.wait(stop).await {
            return Flow::Stop;
        }

        let result = tokio::select! {
            _ = stop.cancelled() => return Flow::Stop,
            result = self.fetcher.fetch(&queued.url, stop) => result,
        };
        self.pacer.mark();

        let (final_url, body) = match result {
            FetchResult::Success {
                final_url, body, ..
            } => (final_url, Some(body)),
            FetchResult::NotHtml {
                final_url,
                content_type,
            } => {
                tracing::debug!("Non-HTML content at {}: {}", final_url, content_type);
                (final_url, None)
            }
            FetchResult::HttpError {
                status_code,
                attempts,
            } => {
                tracing::warn!(
                    "Fetch failed for {}: HTTP {} after {} attempt(s)",
                    queued.url,
                    status_code,
                    attempts
                );
                stats.errors_fetch += 1;
                return Flow::Continue;
            }
            FetchResult::NetworkError { error, attempts } => {
                tracing::warn!(
                    "Fetch failed for {}: {} after {} attempt(s)",
                    queued.url,
                    error,
                    attempts
                );
                stats.errors_fetch += 1;
                return Flow::Continue;
            }
            FetchResult::Cancelled => return Flow::Stop,
        };

        // Redirects can leave the crawl scope
        let page_url = match canonicalize(&final_url) {
            Ok(url) if self.scope.contains_str(&url) => url,
            _ => {
                tracing::debug!("Final URL {} is off scope (from {})", final_url, queued.url);
                stats.skipped_off_scope += 1;
                return Flow::Continue;
            }
        };
        state.seen.insert(page_url.clone());

        let Some(body) = body else {
            stats.skipped_non_html += 1;
            return Flow::Continue;
        };

        if let Some(limit) = self.config.html_size_limit() {
            if body.len() > limit {
                tracing::debug!("Skipping {}: {} bytes exceeds {}", page_url, body.len(), limit);
                stats.skipped_too_large += 1;
                return Flow::Continue;
            }
        }

        let (title, text) = extract_title_and_text(&body);

        if self.config.enable_content_dedupe && !state.content_hashes.insert(content_hash(&text)) {
            tracing::debug!("Duplicate content at {}", page_url);
            stats.duplicates_content += 1;
            return Flow::Continue;
        }

        let record = PageRecord {
            url: page_url.clone(),
            title,
            text,
            depth: queued.depth,
            discovered_from: queued.parent,
        };

        let sent = tokio::select! {
            _ = stop.cancelled() => return Flow::Stop,
            sent = records.send(record) => sent,
        };
        if sent.is_err() {
            tracing::info!("Record consumer closed, stopping crawl");
            return Flow::Stop;
        }

        state.fetched += 1;
        stats.fetched_ok += 1;

        if state.fetched % 10 == 0 {
            tracing::info!(
                "Progress: {} pages fetched, {} in frontier",
                state.fetched,
                state.frontier.len()
            );
        }

        if queued.depth < self.config.max_depth {
            self.enqueue_links(&body, &final_url, &page_url, queued.depth + 1, state, stats);
        }

        Flow::Continue
    }

    /// Adds unseen in-scope links from a page to the frontier
    fn enqueue_links(
        &self,
        body: &str,
        base_url: &str,
        parent: &str,
        depth: u32,
        state: &mut CrawlState,
        stats: &mut CrawlStats,
    ) {
        let links = extract_links(body, base_url, &self.scope, self.config.per_page_link_cap);

        for link in links {
            let canonical = match canonicalize(&link) {
                Ok(url) => url,
                Err(e) => {
                    tracing::trace!("Failed to canonicalize {}: {}", link, e);
                    continue;
                }
            };

            if self.scope.contains_str(&canonical) && state.seen.insert(canonical.clone()) {
                tracing::trace!("Enqueued {} at depth {}", canonical, depth);
                state.frontier.push_back(QueuedUrl {
                    url: canonical,
                    depth,
                    parent: Some(parent.to_string()),
                });
                stats.enqueued += 1;
            } else {
                stats.duplicates += 1;
            }
        }
    }

    /// Runs the crawl on a background task
    ///
    /// Records arrive on the returned handle through a channel bounded by
    /// `channel_capacity`.
    pub fn spawn(mut self) -> CrawlHandle {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let cancel = self.cancel.clone();

        let task = tokio::spawn(async move {
            let mut stats = CrawlStats::default();
            self.run(&mut stats, &tx).await?;
            Ok::<_, MinerError>(stats)
        });

        CrawlHandle {
            records: rx,
            task,
            cancel,
        }
    }

    /// Runs the crawl to completion and gathers every record in memory
    pub async fn collect(self) -> Result<(Vec<PageRecord>, CrawlStats), MinerError> {
        let mut handle = self.spawn();
        let mut records = Vec::new();
        while let Some(record) = handle.next().await {
            records.push(record);
        }
        let stats = handle.finish().await?;
        Ok((records, stats))
    }
}

/// Handle to a crawl running on a background task
pub struct CrawlHandle {
    records: mpsc::Receiver<PageRecord>,
    task: JoinHandle<Result<CrawlStats, MinerError>>,
    cancel: CancellationToken,
}

impl CrawlHandle {
    /// Receives the next record; `None` once the crawl has ended
    pub async fn next(&mut self) -> Option<PageRecord> {
        self.records.recv().await
    }

    /// Requests cancellation; records already sent can still be received
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the crawl task and returns its statistics
    ///
    /// Records not yet received are discarded.
    pub async fn finish(self) -> Result<CrawlStats, MinerError> {
        drop(self.records);
        self.task
            .await
            .map_err(|e| MinerError::Task(e.to_string()))?
    }
}

/// SHA-256 of the whitespace-collapsed text, truncated before hashing
fn content_hash(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let bounded: String = collapsed.chars().take(CONTENT_HASH_MAX_CHARS).collect();
    hex::encode(Sha256::digest(bounded.as_bytes()))
}

/// Runs a complete crawl and returns its records and statistics
///
/// # Example
///
/// ```no_run
/// use insight_miner::config::CrawlConfig;
/// use insight_miner::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (records, stats) = run_crawl(CrawlConfig::new("https://example.com/")).await?;
/// println!("{} pages, {} robots skips", records.len(), stats.skipped_robots);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: CrawlConfig) -> Result<(Vec<PageRecord>, CrawlStats), MinerError> {
    Coordinator::new(config)?.collect().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_ignores_whitespace_layout() {
        assert_eq!(content_hash("a  b\n c"), content_hash("a b c"));
        assert_ne!(content_hash("a b c"), content_hash("a b d"));
        assert_eq!(content_hash("").len(), 64);
    }

    #[test]
    fn test_content_hash_truncates() {
        let base = "x".repeat(CONTENT_HASH_MAX_CHARS);
        let longer = format!("{}yyy", base);
        assert_eq!(content_hash(&base), content_hash(&longer));
    }

    #[test]
    fn test_new_rejects_invalid_seed() {
        assert!(Coordinator::new(CrawlConfig::new("not a url")).is_err());
        assert!(Coordinator::new(CrawlConfig::new("ftp://example.com/")).is_err());
    }

    #[test]
    fn test_new_canonicalizes_seed() {
        let coordinator =
            Coordinator::new(CrawlConfig::new("https://Example.com/docs/?utm_source=x#top"))
                .unwrap();
        assert_eq!(coordinator.seed(), "https://example.com/docs");
    }

    #[test]
    fn test_state_starts_with_seed() {
        let state = CrawlState::new("https://example.com/");
        assert_eq!(state.frontier.len(), 1);
        assert!(state.seen.contains("https://example.com/"));
        assert_eq!(state.frontier[0].depth, 0);
        assert!(state.frontier[0].parent.is_none());
    }

    #[tokio::test]
    async fn test_run_is_single_use() {
        let mut coordinator = Coordinator::new(CrawlConfig::new("https://example.com/")).unwrap();
        coordinator.cancellation_token().cancel();

        let (tx, _rx) = mpsc::channel(1);
        let mut stats = CrawlStats::default();
        coordinator.run(&mut stats, &tx).await.unwrap();
        assert_eq!(stats, CrawlStats::default());
        assert!(coordinator.run(&mut stats, &tx).await.is_err());
    }
}
