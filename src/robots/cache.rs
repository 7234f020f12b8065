//! Robots.txt caching implementation
//!
//! A bounded least-recently-used cache keyed by robots.txt URL. Each crawl
//! owns its own cache, so no state leaks between runs.

use crate::robots::ParsedRobots;
use indexmap::IndexMap;
use std::time::{Duration, Instant};

/// Cached robots.txt data for a host
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// The parsed robots.txt content
    pub content: ParsedRobots,

    /// When the robots.txt was fetched
    pub fetched_at: Instant,
}

impl CachedRobots {
    pub fn new(content: ParsedRobots) -> Self {
        Self {
            content,
            fetched_at: Instant::now(),
        }
    }

    /// Returns the age of the cached robots.txt
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }
}

/// Bounded LRU cache of parsed robots files
///
/// Entries are kept in recency order: the front is the least recently used
/// and is evicted first once `capacity` is exceeded.
#[derive(Debug)]
pub struct RobotsCache {
    entries: IndexMap<String, CachedRobots>,
    capacity: usize,
}

impl RobotsCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: IndexMap::with_capacity(capacity),
            capacity,
        }
    }

    /// Looks up an entry and marks it as most recently used
    pub fn get(&mut self, robots_url: &str) -> Option<&CachedRobots> {
        let entry = self.entries.shift_remove(robots_url)?;
        self.entries.insert(robots_url.to_string(), entry);
        self.entries.get(robots_url)
    }

    /// Inserts an entry, evicting the least recently used one if full
    pub fn insert(&mut self, robots_url: &str, robots: ParsedRobots) {
        self.entries.shift_remove(robots_url);
        self.entries
            .insert(robots_url.to_string(), CachedRobots::new(robots));

        while self.entries.len() > self.capacity {
            if let Some((evicted, _)) = self.entries.shift_remove_index(0) {
                tracing::debug!("Evicted robots.txt cache entry: {}", evicted);
            }
        }
    }

    pub fn contains(&self, robots_url: &str) -> bool {
        self.entries.contains_key(robots_url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
