//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use site_sift::config::Config;
use site_sift::crawler::{Coordinator, CrawlMode};
use site_sift::output::FsPageSink;
use site_sift::{CrawlState, SiteSearchError};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts and a small pool
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.user_agent.value = "TestBot/1.0".to_string();
    config.crawler.workers = 4;
    config.crawler.shutdown_grace_secs = 5;
    config.crawler.request_timeout_secs = 5;
    config.crawler.connect_timeout_secs = 2;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_raw(format!("<html><body>{}</body></html>", body), "text/html; charset=utf-8")
}

/// Mounts a small site:
///
/// ```text
/// /        -> /page1, /page2, /logo.png, /gallery.png/, external
/// /page1   -> /page3
/// /page2   -> (none)
/// /page3   -> /
/// ```
async fn mount_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r##"<h1>Home</h1>
            <a href="/page1">Page 1</a>
            <a href="/page2">Page 2</a>
            <a href="/logo.png">Logo</a>
            <a href="/gallery.png/">Gallery</a>
            <a href="https://external.example.org/">External</a>
            <a href="mailto:owner@example.com">Mail</a>
            <a href="javascript:void(0)">Nothing</a>
            <a href="#top">Top</a>"##,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(r#"<p>First page</p><a href="/page3">Page 3</a>"#))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html("<p>Second page</p>"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page3"))
        .respond_with(html(r#"<p>Third page</p><a href="/">Home</a>"#))
        .mount(server)
        .await;

    // Image links are filtered before any request is made
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "image/png"))
        .expect(0)
        .mount(server)
        .await;

    // A trailing slash keeps the link; canonicalization then drops the slash
    Mock::given(method("GET"))
        .and(path("/gallery.png"))
        .respond_with(html("<p>Gallery</p>"))
        .expect(1)
        .mount(server)
        .await;
}

fn stored_files(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;
    let pages_dir = TempDir::new().unwrap();

    let sink = Arc::new(FsPageSink::new(pages_dir.path()).unwrap());
    let coordinator = Coordinator::new(create_test_config(), CrawlMode::Sequential, sink).unwrap();

    let report = coordinator.crawl(&mock_server.uri(), 3).await.unwrap();

    // /, /page1, /page3, /page2, /gallery.png
    assert_eq!(report.pages_admitted, 5);
    assert_eq!(report.pages_stored, 5);
    assert_eq!(report.discovered_hosts, vec!["127.0.0.1".to_string()]);
    assert!(!report.abandoned);
    assert_eq!(coordinator.state(), CrawlState::Done);
    assert_eq!(coordinator.base_domain(), Some("127.0.0.1"));
    assert_eq!(stored_files(&pages_dir).len(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_full_crawl_concurrent() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;
    let pages_dir = TempDir::new().unwrap();

    let sink = Arc::new(FsPageSink::new(pages_dir.path()).unwrap());
    let coordinator = Coordinator::new(create_test_config(), CrawlMode::Concurrent, sink).unwrap();

    let report = coordinator.crawl(&mock_server.uri(), 3).await.unwrap();

    assert_eq!(report.pages_admitted, 5);
    assert_eq!(report.pages_stored, 5);
    assert_eq!(report.mode, CrawlMode::Concurrent);
    assert!(!report.abandoned);
    assert_eq!(stored_files(&pages_dir).len(), 5);
}

#[tokio::test]
async fn test_crawl_with_depth_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/level1">Level 1</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/level1"))
        .respond_with(html(r#"<a href="/level2">Level 2</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/level2"))
        .respond_with(html("deep"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let pages_dir = TempDir::new().unwrap();
    let sink = Arc::new(FsPageSink::new(pages_dir.path()).unwrap());
    let coordinator = Coordinator::new(create_test_config(), CrawlMode::Sequential, sink).unwrap();

    let report = coordinator.crawl(&mock_server.uri(), 2).await.unwrap();
    assert_eq!(report.pages_admitted, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_page_cap_limits_requests() {
    let mock_server = MockServer::start().await;

    let links: String = (0..30)
        .map(|i| format!(r#"<a href="/item{}">Item {}</a>"#, i, i))
        .collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&links))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(html("item"))
        .mount(&mock_server)
        .await;

    for mode in [CrawlMode::Sequential, CrawlMode::Concurrent] {
        let mut config = create_test_config();
        config.crawler.max_pages = 7;

        let pages_dir = TempDir::new().unwrap();
        let sink = Arc::new(FsPageSink::new(pages_dir.path()).unwrap());
        let coordinator = Coordinator::new(config, mode, sink).unwrap();

        let report = coordinator.crawl(&mock_server.uri(), 2).await.unwrap();
        assert_eq!(report.pages_admitted, 7, "mode {}", mode);
        assert_eq!(report.pages_stored, 7, "mode {}", mode);
    }
}

#[tokio::test]
async fn test_content_type_handling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/data">Data</a><a href="/broken">Broken</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_string(r#"{"href": "/hidden"}"#),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let pages_dir = TempDir::new().unwrap();
    let sink = Arc::new(FsPageSink::new(pages_dir.path()).unwrap());
    let coordinator = Coordinator::new(create_test_config(), CrawlMode::Sequential, sink).unwrap();

    let report = coordinator.crawl(&mock_server.uri(), 3).await.unwrap();

    // Non-HTML and failed pages are admitted but produce no document
    assert_eq!(report.pages_admitted, 3);
    assert_eq!(report.pages_stored, 1);
    assert_eq!(stored_files(&pages_dir).len(), 1);
}

#[tokio::test]
async fn test_invalid_seed_aborts_crawl() {
    let pages_dir = TempDir::new().unwrap();
    let sink = Arc::new(FsPageSink::new(pages_dir.path()).unwrap());
    let coordinator = Coordinator::new(create_test_config(), CrawlMode::Sequential, sink).unwrap();

    let err = coordinator.crawl("http://exa mple.com/", 2).await.unwrap_err();
    assert!(matches!(err, SiteSearchError::InvalidSeed { .. }));
    assert!(stored_files(&pages_dir).is_empty());
}
