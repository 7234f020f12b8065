//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! The [`RobotsAuthority`] is owned by a single crawl and decides, per URL,
//! whether the crawler may fetch it.

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsCache};
pub use parser::{product_token, ParsedRobots};

use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Timeout for robots.txt requests
const ROBOTS_TIMEOUT: Duration = Duration::from_secs(8);

/// Fetches robots.txt files on demand and answers permission queries
pub struct RobotsAuthority {
    client: Client,
    cache: RobotsCache,
}

impl RobotsAuthority {
    /// Creates an authority with its own bounded cache
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for robots.txt requests
    /// * `capacity` - Maximum number of cached robots files
    pub fn new(client: Client, capacity: usize) -> Self {
        Self {
            client,
            cache: RobotsCache::new(capacity),
        }
    }

    /// Returns the robots.txt URL governing `url`
    ///
    /// # Examples
    ///
    /// ```
    /// use insight_miner::robots::RobotsAuthority;
    ///
    /// let robots = RobotsAuthority::robots_url("https://Example.com:8443/a/b?c=d").unwrap();
    /// assert_eq!(robots, "https://example.com:8443/robots.txt");
    /// ```
    pub fn robots_url(url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        parsed.host_str()?;
        parsed.join("/robots.txt").ok().map(|u| u.to_string())
    }

    /// Decides whether `user_agent` may fetch `url`
    ///
    /// The robots.txt file for the URL's origin is fetched once and cached.
    /// With `fallback_allow`, error responses, HTML placeholders, and network
    /// failures resolve to allow.
    pub async fn can_fetch(&mut self, user_agent: &str, url: &str, fallback_allow: bool) -> bool {
        let Some(robots_url) = Self::robots_url(url) else {
            tracing::debug!("No robots.txt origin for {}, allowing", url);
            return true;
        };

        if let Some(cached) = self.cache.get(&robots_url) {
            tracing::trace!("Using cached robots.txt: {}", robots_url);
            return cached.content.can_fetch(url, user_agent, fallback_allow);
        }

        let robots = self.fetch(&robots_url).await;
        let allowed = robots.can_fetch(url, user_agent, fallback_allow);
        self.cache.insert(&robots_url, robots);
        allowed
    }

    /// Fetches and parses one robots.txt file; never fails
    async fn fetch(&self, robots_url: &str) -> ParsedRobots {
        tracing::debug!("Fetching robots.txt: {}", robots_url);

        match self
            .client
            .get(robots_url)
            .timeout(ROBOTS_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = match response.text().await {
                    Ok(body) => body,
                    Err(e) => {
                        tracing::debug!("Failed to read robots.txt body {}: {}", robots_url, e);
                        String::new()
                    }
                };
                tracing::debug!("robots.txt {} returned HTTP {}", robots_url, status);
                ParsedRobots::from_response(status, &body)
            }
            Err(e) => {
                tracing::warn!("robots.txt unreachable at {}: {}", robots_url, e);
                ParsedRobots::unreachable()
            }
        }
    }
}
