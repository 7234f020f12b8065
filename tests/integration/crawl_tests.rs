//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive the real
//! crawl engine end-to-end.

use insight_miner::config::CrawlConfig;
use insight_miner::crawler::Coordinator;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header_exists, headers, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration seeded at the mock server root
fn test_config(base_url: &str) -> CrawlConfig {
    CrawlConfig {
        seed: format!("{}/", base_url),
        rps: 200.0,
        timeout: 5,
        retry_backoff_base: 0.01,
        user_agent: "InsightMinerTest/1.0".to_string(),
        ..CrawlConfig::default()
    }
}

fn html(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ),
        "text/html; charset=utf-8",
    )
}

async fn mount_page(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, content: &str) {
    mount_page(
        server,
        "/robots.txt",
        ResponseTemplate::new(200).set_body_string(content.to_string()),
    )
    .await;
}

async fn requests_to(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == route)
        .count()
}

#[tokio::test]
async fn test_single_page_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(
        &mock_server,
        "/",
        html("Home", "<p>Validators stake ETH to secure the network.</p>"),
    )
    .await;

    let config = CrawlConfig {
        max_depth: 0,
        max_pages: 1,
        ..test_config(&base_url)
    };

    let (records, stats) = Coordinator::new(config)
        .expect("valid config")
        .collect()
        .await
        .expect("crawl should succeed");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].depth, 0);
    assert_eq!(records[0].discovered_from, None);
    assert_eq!(records[0].title, "Home");
    assert_eq!(records[0].text, "Validators stake ETH to secure the network.");
    assert_eq!(stats.fetched_ok, 1);
}

#[tokio::test]
async fn test_breadth_first_depth_limit() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        html("Home", r#"<a href="/a">A</a> <a href="/b/">B</a> <p>Home page</p>"#),
    )
    .await;
    mount_page(
        &mock_server,
        "/a",
        html("A", r#"<a href="/c">C</a> <p>Page A content</p>"#),
    )
    .await;
    mount_page(&mock_server, "/b", html("B", "<p>Page B content</p>")).await;
    mount_page(&mock_server, "/c", html("C", "<p>Page C content</p>")).await;

    let config = CrawlConfig {
        max_depth: 1,
        ..test_config(&base_url)
    };

    let (records, stats) = Coordinator::new(config)
        .unwrap()
        .collect()
        .await
        .unwrap();

    let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
    let root = format!("{}/", base_url);
    assert_eq!(
        urls,
        vec![
            root.clone(),
            format!("{}/a", base_url),
            format!("{}/b", base_url)
        ]
    );
    assert_eq!(records[1].depth, 1);
    assert_eq!(records[1].discovered_from.as_deref(), Some(root.as_str()));
    assert_eq!(records[2].discovered_from.as_deref(), Some(root.as_str()));
    assert!(records.iter().all(|r| r.depth <= 1));
    assert_eq!(stats.enqueued, 2);
    assert_eq!(requests_to(&mock_server, "/c").await, 0);
}

#[tokio::test]
async fn test_robots_disallow_all() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nDisallow: /").await;
    mount_page(&mock_server, "/", html("Home", "<p>Hidden</p>")).await;

    let (records, stats) = Coordinator::new(test_config(&base_url))
        .unwrap()
        .collect()
        .await
        .unwrap();

    assert!(records.is_empty());
    assert!(stats.skipped_robots >= 1);
    assert_eq!(requests_to(&mock_server, "/").await, 0);
}

#[tokio::test]
async fn test_robots_server_error_denies_without_fallback() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/robots.txt", ResponseTemplate::new(500)).await;
    mount_page(&mock_server, "/", html("Home", "<p>Content</p>")).await;

    let (records, stats) = Coordinator::new(test_config(&base_url))
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert!(records.is_empty());
    assert_eq!(stats.skipped_robots, 1);

    let config = CrawlConfig {
        robots_fallback_allow: true,
        ..test_config(&base_url)
    };
    let (records, _) = Coordinator::new(config).unwrap().collect().await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_retry_then_success() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("Home", "<p>Finally served</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = CrawlConfig {
        retry_attempts: 4,
        ..test_config(&base_url)
    };

    let (records, stats) = Coordinator::new(config)
        .unwrap()
        .collect()
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(stats.errors_fetch, 0);
    assert_eq!(requests_to(&mock_server, "/").await, 3);
}

#[tokio::test]
async fn test_retries_exhausted() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", ResponseTemplate::new(503)).await;

    let config = CrawlConfig {
        retry_attempts: 2,
        ..test_config(&base_url)
    };

    let (records, stats) = Coordinator::new(config)
        .unwrap()
        .collect()
        .await
        .unwrap();

    assert!(records.is_empty());
    assert_eq!(stats.errors_fetch, 1);
    assert_eq!(requests_to(&mock_server, "/").await, 2);
}

#[tokio::test]
async fn test_non_retryable_status_not_retried() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", ResponseTemplate::new(404)).await;

    let (records, stats) = Coordinator::new(test_config(&base_url))
        .unwrap()
        .collect()
        .await
        .unwrap();

    assert!(records.is_empty());
    assert_eq!(stats.errors_fetch, 1);
    assert_eq!(requests_to(&mock_server, "/").await, 1);
}

#[tokio::test]
async fn test_content_dedupe() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        html("Home", r#"<a href="/a">A</a> <a href="/b">B</a> <p>Landing</p>"#),
    )
    .await;
    mount_page(&mock_server, "/a", html("Copy", "<p>Same body text</p>")).await;
    mount_page(&mock_server, "/b", html("Copy", "<p>Same   body text</p>")).await;

    let (records, stats) = Coordinator::new(test_config(&base_url))
        .unwrap()
        .collect()
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].url, format!("{}/a", base_url));
    assert_eq!(stats.duplicates_content, 1);
}

#[tokio::test]
async fn test_content_dedupe_disabled() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        html("Home", r#"<a href="/a">A</a> <a href="/b">B</a> <p>Landing</p>"#),
    )
    .await;
    mount_page(&mock_server, "/a", html("Copy", "<p>Same body text</p>")).await;
    mount_page(&mock_server, "/b", html("Copy", "<p>Same body text</p>")).await;

    let config = CrawlConfig {
        enable_content_dedupe: false,
        ..test_config(&base_url)
    };
    let (records, stats) = Coordinator::new(config).unwrap().collect().await.unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(stats.duplicates_content, 0);
}

#[tokio::test]
async fn test_oversized_page_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let big = format!("<p>{}</p>", "staking ".repeat(100));
    mount_page(&mock_server, "/", html("Big", &big)).await;

    let config = CrawlConfig {
        max_html_bytes: Some(100),
        ..test_config(&base_url)
    };

    let (records, stats) = Coordinator::new(config)
        .unwrap()
        .collect()
        .await
        .unwrap();

    assert!(records.is_empty());
    assert_eq!(stats.skipped_too_large, 1);
    assert_eq!(stats.fetched_ok, 0);
}

#[tokio::test]
async fn test_non_html_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        html("Home", r#"<a href="/whitepaper.pdf">Paper</a> <p>Landing</p>"#),
    )
    .await;
    mount_page(
        &mock_server,
        "/whitepaper.pdf",
        ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
    )
    .await;

    let (records, stats) = Coordinator::new(test_config(&base_url))
        .unwrap()
        .collect()
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(stats.skipped_non_html, 1);
}

#[tokio::test]
async fn test_redirect_off_scope() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let port = mock_server.address().port();

    mount_page(
        &mock_server,
        "/",
        html("Home", r#"<a href="/away">Away</a> <p>Landing</p>"#),
    )
    .await;
    mount_page(
        &mock_server,
        "/away",
        ResponseTemplate::new(302)
            .insert_header("location", format!("http://localhost:{}/elsewhere", port).as_str()),
    )
    .await;
    mount_page(&mock_server, "/elsewhere", html("Elsewhere", "<p>Other site</p>")).await;

    let (records, stats) = Coordinator::new(test_config(&base_url))
        .unwrap()
        .collect()
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(stats.skipped_off_scope, 1);
}

#[tokio::test]
async fn test_max_pages_limit() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        html(
            "Home",
            r#"<a href="/a">A</a> <a href="/b">B</a> <a href="/c">C</a> <p>Landing</p>"#,
        ),
    )
    .await;
    for route in ["/a", "/b", "/c"] {
        mount_page(&mock_server, route, html(route, &format!("<p>Page {}</p>", route))).await;
    }

    let config = CrawlConfig {
        max_pages: 2,
        ..test_config(&base_url)
    };
    let (records, stats) = Coordinator::new(config).unwrap().collect().await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(stats.fetched_ok, 2);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", html("Home", "<p>Landing</p>")).await;

    let token = CancellationToken::new();
    token.cancel();

    let (records, stats) = Coordinator::new(test_config(&base_url))
        .unwrap()
        .with_cancellation(token)
        .collect()
        .await
        .unwrap();

    assert!(records.is_empty());
    assert_eq!(stats.fetched_ok, 0);
    assert_eq!(requests_to(&mock_server, "/").await, 0);
}

#[tokio::test]
async fn test_deadline_stops_slow_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        html("Slow", "<p>Too late</p>").set_delay(Duration::from_secs(10)),
    )
    .await;

    let config = CrawlConfig {
        max_duration: Some(1),
        timeout: 30,
        ..test_config(&base_url)
    };

    let started = Instant::now();
    let (records, _) = Coordinator::new(config).unwrap().collect().await.unwrap();

    assert!(records.is_empty());
    assert!(started.elapsed() < Duration::from_secs(8));
}

#[tokio::test]
async fn test_spawned_crawl_streams_records() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        html("Home", r#"<a href="/a">A</a> <p>Landing</p>"#),
    )
    .await;
    mount_page(&mock_server, "/a", html("A", "<p>Page A</p>")).await;

    let config = CrawlConfig {
        channel_capacity: 1,
        ..test_config(&base_url)
    };
    let mut handle = Coordinator::new(config).unwrap().spawn();

    let mut depths = Vec::new();
    while let Some(record) = handle.next().await {
        depths.push(record.depth);
    }
    let stats = handle.finish().await.unwrap();

    assert_eq!(depths, vec![0, 1]);
    assert_eq!(stats.fetched_ok, 2);
}

#[tokio::test]
async fn test_browser_headers_sent_when_enabled() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    // Comma-separated header values are matched as a list
    Mock::given(method("GET"))
        .and(path("/"))
        .and(headers("accept-language", vec!["en-US", "en;q=0.9"]))
        .respond_with(html("Home", "<p>Operators publish uptime reports.</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = CrawlConfig {
        max_depth: 0,
        browser_headers: true,
        ..test_config(&base_url)
    };

    let (records, _) = Coordinator::new(config)
        .expect("valid config")
        .collect()
        .await
        .expect("crawl should succeed");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Home");
}

#[tokio::test]
async fn test_browser_headers_absent_by_default() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header_exists("accept-language"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/",
        html("Home", "<p>Operators publish uptime reports.</p>"),
    )
    .await;

    let config = CrawlConfig {
        max_depth: 0,
        ..test_config(&base_url)
    };
    assert!(!config.browser_headers);

    let (records, stats) = Coordinator::new(config)
        .expect("valid config")
        .collect()
        .await
        .expect("crawl should succeed");

    assert_eq!(records.len(), 1);
    assert_eq!(stats.fetched_ok, 1);
    assert_eq!(requests_to(&mock_server, "/").await, 1);
}

#[tokio::test]
async fn test_invalid_seed_rejected() {
    let config = CrawlConfig::new("ftp://example.com/");
    assert!(Coordinator::new(config).is_err());
}
