//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use linkcrawl::config::Credentials;
use linkcrawl::{CrawlResult, CrawlSummary, Crawler, CrawlerConfig, FetchError, PageError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Runs a crawl and collects its results by URL
async fn run_crawl(
    config: CrawlerConfig,
    seed: &str,
) -> (HashMap<String, CrawlResult>, CrawlSummary) {
    let crawler = Crawler::new(config).expect("Failed to create crawler");
    let results = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&results);

    let summary = crawler
        .crawl(seed, move |result| sink.lock().unwrap().push(result))
        .await;

    let results = std::mem::take(&mut *results.lock().unwrap());
    let count = results.len();
    let by_url: HashMap<String, CrawlResult> =
        results.into_iter().map(|r| (r.url.clone(), r)).collect();
    assert_eq!(by_url.len(), count, "a URL was emitted more than once");

    (by_url, summary)
}

async fn hits(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == route)
        .count()
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/b">B</a><a href="http://external.invalid/c">C</a></body></html>"#,
    )
    .await;
    mount_page(&server, "/b", r#"<html><body><a href="/">Home</a></body></html>"#).await;

    let seed = format!("{}/", base);
    let (results, summary) = run_crawl(CrawlerConfig::default(), &seed).await;

    assert_eq!(results.len(), 2);
    assert_eq!(summary.emitted, 2);

    let root = &results[&seed];
    assert_eq!(root.depth, 0);
    assert!(root.error.is_none());
    assert_eq!(
        root.found_urls,
        vec![format!("{}/b", base), "http://external.invalid/c".to_string()]
    );

    let b = &results[&format!("{}/b", base)];
    assert_eq!(b.depth, 1);
    assert_eq!(b.found_urls, vec![seed.clone()]);

    assert_eq!(hits(&server, "/").await, 1);
    assert_eq!(hits(&server, "/b").await, 1);
}

#[tokio::test]
async fn test_auth_and_user_agent_sent() {
    let server = MockServer::start().await;

    // "alice:secret"
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("authorization", "Basic YWxpY2U6c2VjcmV0"))
        .and(header("user-agent", "TestBot/1.0"))
        .respond_with(html("<html><body>ok</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let config = CrawlerConfig {
        auth: Some(Credentials {
            username: "alice".to_string(),
            password: "secret".to_string(),
        }),
        user_agent: Some("TestBot/1.0".to_string()),
        ..CrawlerConfig::default()
    };
    let seed = format!("{}/", server.uri());
    let (results, _) = run_crawl(config, &seed).await;

    assert!(results[&seed].error.is_none());
}

#[tokio::test]
async fn test_missing_auth_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("authorization", "Basic YWxpY2U6c2VjcmV0"))
        .respond_with(html("<html><body>ok</body></html>"))
        .mount(&server)
        .await;

    let seed = format!("{}/", server.uri());
    let (results, summary) = run_crawl(CrawlerConfig::default(), &seed).await;

    assert!(matches!(
        results[&seed].error,
        Some(PageError::Fetch {
            source: FetchError::Status { status: 404, .. },
            ..
        })
    ));
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn test_server_error_reported() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/broken">broken</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let seed = format!("{}/", server.uri());
    let (results, _) = run_crawl(CrawlerConfig::default(), &seed).await;

    let broken = &results[&format!("{}/broken", server.uri())];
    assert!(broken.found_urls.is_empty());
    match &broken.error {
        Some(PageError::Fetch { attempts, source }) => {
            assert_eq!(*attempts, 1);
            assert!(matches!(source, FetchError::Status { status: 500, .. }));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_retries_until_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_page(&server, "/", "<html><body>finally</body></html>").await;

    let config = CrawlerConfig {
        retries: 3,
        retry_delay: Duration::from_millis(20),
        ..CrawlerConfig::default()
    };
    let seed = format!("{}/", server.uri());
    let (results, _) = run_crawl(config, &seed).await;

    assert!(results[&seed].error.is_none());
    assert_eq!(hits(&server, "/").await, 3);
}

#[tokio::test]
async fn test_retries_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = CrawlerConfig {
        retries: 2,
        ..CrawlerConfig::default()
    };
    let seed = format!("{}/", server.uri());
    let (results, _) = run_crawl(config, &seed).await;

    assert!(matches!(
        results[&seed].error,
        Some(PageError::Fetch { attempts: 3, .. })
    ));
    assert_eq!(hits(&server, "/").await, 3);
}

#[tokio::test]
async fn test_non_html_not_reported_or_followed() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/file.pdf">pdf</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/file.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"<a href="/secret">x</a>"#, "application/pdf"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/secret"))
        .respond_with(html("secret"))
        .expect(0)
        .mount(&server)
        .await;

    let seed = format!("{}/", server.uri());
    let (results, summary) = run_crawl(CrawlerConfig::default(), &seed).await;

    assert_eq!(results.len(), 1);
    assert_eq!(summary.non_html, 1);
}

#[tokio::test]
async fn test_hash_check_detects_same_content() {
    let server = MockServer::start().await;
    let same = r#"<html><body><a href="/two">next</a></body></html>"#;

    mount_page(&server, "/", r#"<a href="/one">one</a>"#).await;
    mount_page(&server, "/one", same).await;
    mount_page(&server, "/two", same).await;

    let config = CrawlerConfig {
        hash_check: true,
        ..CrawlerConfig::default()
    };
    let seed = format!("{}/", server.uri());
    let (results, _) = run_crawl(config, &seed).await;

    let one_url = format!("{}/one", server.uri());
    let two = &results[&format!("{}/two", server.uri())];
    assert!(two.found_urls.is_empty());
    match &two.error {
        Some(PageError::DuplicateContent { original }) => assert_eq!(original, &one_url),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(results[&one_url].error.is_none());
}

#[tokio::test]
async fn test_max_depth_limits_requests() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/1">1</a>"#).await;
    mount_page(&server, "/1", r#"<a href="/2">2</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/2"))
        .respond_with(html("too deep"))
        .expect(0)
        .mount(&server)
        .await;

    let config = CrawlerConfig {
        max_depth: 1,
        ..CrawlerConfig::default()
    };
    let seed = format!("{}/", server.uri());
    let (results, _) = run_crawl(config, &seed).await;

    assert_eq!(results.len(), 2);
    assert!(results.values().all(|r| r.depth <= 1));
}

#[tokio::test]
async fn test_timeout_is_a_fetch_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("slow").set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let config = CrawlerConfig {
        timeout: Duration::from_millis(200),
        ..CrawlerConfig::default()
    };
    let seed = format!("{}/", server.uri());
    let (results, _) = run_crawl(config, &seed).await;

    assert!(matches!(
        results[&seed].error,
        Some(PageError::Fetch {
            source: FetchError::Request { .. },
            ..
        })
    ));
}

#[tokio::test]
async fn test_unreachable_seed() {
    let seed = "http://127.0.0.1:1/";
    let (results, summary) = run_crawl(CrawlerConfig::default(), seed).await;

    assert_eq!(summary.emitted, 1);
    assert!(matches!(
        results[seed].error,
        Some(PageError::Fetch {
            source: FetchError::Request { .. },
            ..
        })
    ));
}
