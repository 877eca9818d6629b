//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive the full
//! worker pool over a real frontier database end to end.

use std::path::Path;
use sumi_frontier::config::{Config, CrawlerConfig, FrontierConfig, StorageConfig, UserAgentConfig};
use sumi_frontier::crawler::crawl;
use sumi_frontier::Frontier;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config(seed: String, db_path: &Path, respect_robots: bool) -> Config {
    Config {
        crawler: CrawlerConfig {
            seeds: vec![seed],
            allowed_domains: vec![],
            time_delay: 10,
            workers: 2,
            respect_robots,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        storage: StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
        },
        frontier: FrontierConfig::default(),
    }
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/html")
}

/// Mounts a small site: `/` links to two pages, a query variant and a
/// robots-disallowed page; `/page2` is missing.
async fn mount_site(server: &MockServer, private_hits: u64) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><head><title>Home</title></head><body>
                <a href="/page1">Page 1</a>
                <a href="/page2">Page 2</a>
                <a href="/page1?x=1">Page 1 variant</a>
                <a href="/private/secret">Secret</a>
                <a href="mailto:someone@example.com">Mail</a>
            </body></html>"#
                .to_string(),
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(
            r#"<html><body><a href="/">Home</a><a href="page2">Page 2</a></body></html>"#
                .to_string(),
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(html("<html><body>secret</body></html>".to_string()))
        .expect(private_hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_drains_frontier() {
    let server = MockServer::start().await;
    mount_site(&server, 0).await;

    let dir = TempDir::new().unwrap();
    let db = dir.path().join("crawl.db");
    let config = create_test_config(format!("{}/", server.uri()), &db, true);

    let summary = crawl(&config, true).await.unwrap();

    // "/", "/page1", "/page2", "/page1?x=1", "/private/secret"
    assert_eq!(summary.processed, 5);
    assert_eq!(summary.stats.records, 5);
    assert_eq!(summary.stats.completed, 5);
    assert_eq!(summary.stats.pending, 0);

    let frontier = Frontier::open(&config, false).unwrap();
    for page in ["/", "/page1", "/page2", "/page1?x=1", "/private/secret"] {
        let url = format!("{}{}", server.uri(), page);
        assert!(frontier.is_crawled(&url).unwrap(), "{} not crawled", url);
    }
}

#[tokio::test]
async fn test_crawl_ignores_robots_when_disabled() {
    let server = MockServer::start().await;
    mount_site(&server, 1).await;

    let dir = TempDir::new().unwrap();
    let db = dir.path().join("crawl.db");
    let config = create_test_config(format!("{}/", server.uri()), &db, false);

    let summary = crawl(&config, true).await.unwrap();
    assert_eq!(summary.stats.completed, 5);
}

#[tokio::test]
async fn test_resumed_finished_crawl_does_nothing() {
    let server = MockServer::start().await;
    mount_site(&server, 0).await;

    let dir = TempDir::new().unwrap();
    let db = dir.path().join("crawl.db");
    let config = create_test_config(format!("{}/", server.uri()), &db, true);

    crawl(&config, true).await.unwrap();
    let resumed = crawl(&config, false).await.unwrap();

    assert_eq!(resumed.processed, 0);
    assert_eq!(resumed.stats.records, 5);
    assert_eq!(resumed.stats.pending, 0);
}

#[tokio::test]
async fn test_crawl_survives_unreachable_seed() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let dir = TempDir::new().unwrap();
    let db = dir.path().join("crawl.db");
    let config = create_test_config(format!("http://127.0.0.1:{}/", port), &db, true);

    let summary = crawl(&config, true).await.unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.stats.completed, 1);
}
