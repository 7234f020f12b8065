//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and headers
//! - GET requests with redirect following
//! - Retry with exponential backoff for transient failures
//! - Skipping body downloads for non-HTML responses

use crate::config::CrawlConfig;
use crate::crawler::pacer::sleep_or_cancel;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Maximum number of redirects followed per request
const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value
        content_type: String,
        /// Page body content
        body: String,
    },

    /// Successful response whose body is not HTML; the body is not read
    NotHtml {
        /// Final URL after redirects
        final_url: String,
        /// The actual Content-Type received
        content_type: String,
    },

    /// Final response had a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
        /// Number of requests made
        attempts: u32,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
        /// Number of requests made
        attempts: u32,
    },

    /// The crawl was cancelled during a retry backoff
    Cancelled,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawl configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use insight_miner::config::CrawlConfig;
/// use insight_miner::crawler::build_http_client;
///
/// let config = CrawlConfig::new("https://example.com/");
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &CrawlConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    if config.browser_headers {
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    }

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(config.request_timeout())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true if a Content-Type header denotes an HTML document
pub fn is_html(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("text/html")
}

/// Fetches pages for a crawl using its retry policy
pub struct Fetcher {
    client: Client,
    config: CrawlConfig,
    retry_attempts: u32,
}

impl Fetcher {
    pub fn new(client: Client, config: &CrawlConfig) -> Self {
        Self {
            client,
            config: config.clone(),
            retry_attempts: config.retry_attempts.max(1),
        }
    }

    /// Fetches a URL with retry logic
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Status in `retry_statuses` | Retry after backoff |
    /// | Transport error (timeout, connect, redirect loop) | Retry after backoff |
    /// | Any other non-2xx status | Immediate → HttpError |
    ///
    /// Attempt `n` (from 0) is followed by a sleep of `backoff_base * 2^n`.
    /// After `retry_attempts` requests the last outcome is reported.
    pub async fn fetch(&self, url: &str, cancel: &CancellationToken) -> FetchResult {
        let mut attempt: u32 = 0;

        loop {
            let outcome = self.client.get(url).send().await;
            let can_retry = attempt + 1 < self.retry_attempts;

            match outcome {
                Ok(response) => {
                    let status = response.status().as_u16();

                    if self.config.is_retryable(status) && can_retry {
                        let delay = self.config.backoff_delay(attempt);
                        tracing::warn!(
                            "HTTP {} for {}, retrying in {:?} (attempt {}/{})",
                            status,
                            url,
                            delay,
                            attempt + 1,
                            self.retry_attempts
                        );
                        if !sleep_or_cancel(delay, cancel).await {
                            return FetchResult::Cancelled;
                        }
                        attempt += 1;
                        continue;
                    }

                    if !response.status().is_success() {
                        return FetchResult::HttpError {
                            status_code: status,
                            attempts: attempt + 1,
                        };
                    }

                    let final_url = response.url().to_string();
                    let content_type = response
                        .headers()
                        .get(CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();

                    if !is_html(&content_type) {
                        return FetchResult::NotHtml {
                            final_url,
                            content_type,
                        };
                    }

                    return match response.text().await {
                        Ok(body) => FetchResult::Success {
                            final_url,
                            status_code: status,
                            content_type,
                            body,
                        },
                        Err(e) => FetchResult::NetworkError {
                            error: format!("Failed to read body: {}", e),
                            attempts: attempt + 1,
                        },
                    };
                }
                Err(e) => {
                    let error = classify_error(&e);
                    if can_retry {
                        let delay = self.config.backoff_delay(attempt);
                        tracing::warn!(
                            "{} for {}, retrying in {:?} (attempt {}/{})",
                            error,
                            url,
                            delay,
                            attempt + 1,
                            self.retry_attempts
                        );
                        if !sleep_or_cancel(delay, cancel).await {
                            return FetchResult::Cancelled;
                        }
                        attempt += 1;
                        continue;
                    }

                    return FetchResult::NetworkError {
                        error,
                        attempts: attempt + 1,
                    };
                }
            }
        }
    }
}

fn classify_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else if e.is_redirect() {
        format!("Redirect error: {}", e)
    } else {
        e.to_string()
    }
}
