//! Integration tests for indexing and search
//!
//! Pages are crawled from a wiremock server into a temporary directory,
//! read back, indexed, exported and queried.

use site_sift::config::Config;
use site_sift::crawler::{Coordinator, CrawlMode};
use site_sift::index::InvertedIndex;
use site_sift::output::{
    load_pages, save_hosts, save_index, write_search_report, FsPageSink, MemoryPageSink,
};
use site_sift::search::{rank, rank_scored};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.workers = 2;
    config.crawler.shutdown_grace_secs = 5;
    config.crawler.request_timeout_secs = 5;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html")
        .set_body_raw(body.to_string(), "text/html")
}

async fn mount_pet_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><head><title>Pets</title><script>var cat = "hidden";</script></head>
            <body><a href="/cats">Cats</a> <a href="/dogs">Dogs</a></body></html>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cats"))
        .respond_with(html("<p>Cat cat cat. Every cat purrs.</p>"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dogs"))
        .respond_with(html("<p>A dog barks at a cat. Dog dog!</p>"))
        .mount(server)
        .await;
}

fn build_index(pages: &[(String, String)]) -> InvertedIndex {
    let mut index = InvertedIndex::new();
    for (name, content) in pages {
        index.add_document(name, content);
    }
    index
}

#[tokio::test]
async fn test_crawl_index_and_search_from_disk() {
    let server = MockServer::start().await;
    mount_pet_site(&server).await;

    let pages_dir = TempDir::new().unwrap();
    let index_dir = TempDir::new().unwrap();

    let sink = Arc::new(FsPageSink::new(pages_dir.path()).unwrap());
    let coordinator = Coordinator::new(create_test_config(), CrawlMode::Sequential, sink).unwrap();
    let report = coordinator.crawl(&server.uri(), 2).await.unwrap();
    assert_eq!(report.pages_stored, 3);

    let pages = load_pages(pages_dir.path()).unwrap();
    assert_eq!(pages.len(), 3);
    let index = build_index(&pages);
    assert_eq!(index.total_documents(), 3);

    let cats_doc = pages
        .iter()
        .find(|(name, _)| name.ends_with("_cats.html"))
        .map(|(name, _)| name.clone())
        .unwrap();
    let dogs_doc = pages
        .iter()
        .find(|(name, _)| name.ends_with("_dogs.html"))
        .map(|(name, _)| name.clone())
        .unwrap();

    // Script text is not indexed, so only the two content pages mention cats
    assert_eq!(rank("cat", &index), vec![cats_doc.clone(), dogs_doc.clone()]);
    assert_eq!(rank("dog", &index), vec![dogs_doc.clone()]);

    save_hosts(&index_dir.path().join("hosts.txt"), &report.discovered_hosts).unwrap();
    save_index(&index_dir.path().join("index.txt"), &index).unwrap();
    let ranked = rank("cat", &index);
    write_search_report(index_dir.path(), "cat", &ranked, 10).unwrap();

    assert_eq!(
        fs::read_to_string(index_dir.path().join("hosts.txt")).unwrap(),
        "127.0.0.1\n"
    );

    let exported = fs::read_to_string(index_dir.path().join("index.txt")).unwrap();
    let dog_line = exported
        .lines()
        .find(|line| line.starts_with("dog:"))
        .unwrap();
    assert_eq!(dog_line, format!("dog:{}(3),", dogs_doc));

    let report_text = fs::read_to_string(index_dir.path().join("last_search.txt")).unwrap();
    assert_eq!(
        report_text,
        format!("Query: cat\n1. {}\n2. {}\n", cats_doc, dogs_doc)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_crawl_into_memory_sink() {
    let server = MockServer::start().await;
    mount_pet_site(&server).await;

    let sink = Arc::new(MemoryPageSink::new());
    let coordinator =
        Coordinator::new(create_test_config(), CrawlMode::Concurrent, sink.clone()).unwrap();
    coordinator.crawl(&server.uri(), 2).await.unwrap();

    let index = build_index(&sink.pages());
    let base = server.uri();

    let scored = rank_scored("barks", &index);
    assert_eq!(scored.len(), 1);
    assert_eq!(scored[0].0, format!("{}/dogs", base));
    assert!(scored[0].1 > 0.0);

    assert_eq!(
        rank("purrs barks", &index),
        vec![format!("{}/cats", base), format!("{}/dogs", base)]
    );
}

#[test]
fn test_index_export_is_reloadable_text() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("index.txt");

    let mut index = InvertedIndex::new();
    index.add_document("b.html", "zeta alpha");
    index.add_document("a.html", "alpha");

    save_index(&path, &index).unwrap();
    save_index(&path, &index).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "alpha:b.html(1),a.html(1),\nzeta:b.html(1),\n");

    let backups = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("index_backup_"))
        .count();
    assert_eq!(backups, 1);
}
