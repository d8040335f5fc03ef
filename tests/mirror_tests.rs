//! Integration tests for the mirror session
//!
//! These tests run full sessions against wiremock servers and verify the
//! on-disk mirror, the traversal bounds, and the session result.

use kagami::config::CrawlConfig;
use kagami::{EngineState, MirrorSession};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server_uri: &str, root: &Path, max_depth: u32) -> CrawlConfig {
    let mut config = CrawlConfig::new(format!("{}/", server_uri), root);
    config.crawl.max_depth = max_depth;
    config.crawl.request_timeout_secs = 5;
    config
}

async fn mount_html(server: &MockServer, url_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(url_path.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn host_dir(server: &MockServer, root: &Path) -> std::path::PathBuf {
    let uri = url::Url::parse(&server.uri()).unwrap();
    root.join(format!(
        "{}_{}",
        uri.host_str().unwrap(),
        uri.port().unwrap()
    ))
}

#[tokio::test]
async fn test_full_mirror_writes_pages_and_resources() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_html(
        &server,
        "/",
        r#"<html><head><title>Home</title>
        <link rel="stylesheet" href="/style.css"></head>
        <body><a href="/about">About</a></body></html>"#
            .to_string(),
    )
    .await;
    mount_html(
        &server,
        "/about",
        r#"<html><head><title>About</title></head><body>About us</body></html>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/style.css"))
        .respond_with(ResponseTemplate::new(200).set_body_string("body { margin: 0 }"))
        .mount(&server)
        .await;

    let result = MirrorSession::new(config(&server.uri(), dir.path(), 2))
        .run()
        .await
        .expect("session failed");

    assert_eq!(result.state, EngineState::Completed);
    assert_eq!(result.pages_ok(), 2);
    assert_eq!(result.pages_failed(), 0);
    assert_eq!(result.resources_fetched(), 1);

    let host = host_dir(&server, dir.path());
    assert!(host.join("index.html").is_file());
    assert!(host.join("about.html").is_file());
    assert_eq!(
        std::fs::read_to_string(host.join("style.css")).unwrap(),
        "body { margin: 0 }"
    );

    // Seed page metadata is captured.
    assert_eq!(
        result.metadata.unwrap().title,
        Some("Home".to_string())
    );
}

#[tokio::test]
async fn test_depth_one_returns_links_but_never_visits_them() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_html(
        &server,
        "/",
        r#"<html><head><link rel="stylesheet" href="/style.css"></head>
        <body><a href="/page2">Page 2</a></body></html>"#
            .to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/style.css"))
        .respond_with(ResponseTemplate::new(200).set_body_string("css"))
        .mount(&server)
        .await;
    // With max-depth 1 the discovered link must never be fetched.
    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let result = MirrorSession::new(config(&server.uri(), dir.path(), 1))
        .run()
        .await
        .expect("session failed");

    assert_eq!(result.pages_ok(), 1);
    assert_eq!(result.resources_fetched(), 1);

    let host = host_dir(&server, dir.path());
    assert!(host.join("index.html").is_file());
    assert!(host.join("style.css").is_file());
    assert!(!host.join("page2.html").exists());
}

#[tokio::test]
async fn test_depth_bound_on_link_chain() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_html(
        &server,
        "/",
        r#"<html><body><a href="/level1">L1</a></body></html>"#.to_string(),
    )
    .await;
    mount_html(
        &server,
        "/level1",
        r#"<html><body><a href="/level2">L2</a></body></html>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/level2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let result = MirrorSession::new(config(&server.uri(), dir.path(), 2))
        .run()
        .await
        .expect("session failed");

    assert_eq!(result.pages_ok(), 2);
    let depths: Vec<u32> = result.pages.iter().map(|p| p.depth).collect();
    assert_eq!(depths, vec![0, 1]);
}

#[tokio::test]
async fn test_seed_failure_completes_with_one_recorded_failure() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = MirrorSession::new(config(&server.uri(), dir.path(), 2))
        .run()
        .await
        .expect("session failed");

    // Best-effort: a dead seed is a recorded failure, not an abort.
    assert_eq!(result.state, EngineState::Completed);
    assert_eq!(result.pages_ok(), 0);
    assert_eq!(result.pages_failed(), 1);
    assert!(matches!(
        result.pages[0].outcome,
        kagami::FetchOutcome::Failed(_)
    ));
}

#[tokio::test]
async fn test_url_visited_at_most_once() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // /shared is discovered from the seed and both child pages, with
    // fragment and trailing-slash variants thrown in.
    mount_html(
        &server,
        "/",
        r#"<html><body>
        <a href="/a">A</a><a href="/b">B</a>
        <a href="/shared">S</a><a href="/shared#frag">S2</a>
        </body></html>"#
            .to_string(),
    )
    .await;
    mount_html(
        &server,
        "/a",
        r#"<html><body><a href="/shared">S</a></body></html>"#.to_string(),
    )
    .await;
    mount_html(
        &server,
        "/b",
        r#"<html><body><a href="/shared/">S</a></body></html>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html></html>")
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = MirrorSession::new(config(&server.uri(), dir.path(), 3))
        .run()
        .await
        .expect("session failed");

    assert_eq!(result.pages_ok(), 4);

    // Every visited URL appears exactly once in the page list.
    let mut urls: Vec<&str> = result.pages.iter().map(|p| p.url.as_str()).collect();
    let total = urls.len();
    urls.sort();
    urls.dedup();
    assert_eq!(urls.len(), total);
}

#[tokio::test]
async fn test_colliding_resource_basenames_first_writer_wins() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_html(
        &server,
        "/",
        r#"<html><body><img src="/a/logo.png"><a href="/page2">P2</a></body></html>"#.to_string(),
    )
    .await;
    mount_html(
        &server,
        "/page2",
        r#"<html><body><img src="/b/logo.png"></body></html>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/a/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_string("first-logo"))
        .expect(1)
        .mount(&server)
        .await;
    // Same basename, already on disk: the second fetch never happens.
    Mock::given(method("GET"))
        .and(path("/b/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_string("second-logo"))
        .expect(0)
        .mount(&server)
        .await;

    let result = MirrorSession::new(config(&server.uri(), dir.path(), 2))
        .run()
        .await
        .expect("session failed");

    // The collision is a cache hit, not an error.
    assert_eq!(result.resources_failed(), 0);
    assert_eq!(result.resources_fetched(), 2);

    let logo = host_dir(&server, dir.path()).join("logo.png");
    assert_eq!(std::fs::read_to_string(logo).unwrap(), "first-logo");
}

#[tokio::test]
async fn test_shared_resource_downloaded_once_within_level() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_html(
        &server,
        "/",
        r#"<html><body><a href="/a">A</a><a href="/b">B</a></body></html>"#.to_string(),
    )
    .await;
    mount_html(
        &server,
        "/a",
        r#"<html><body><img src="/assets/icon.png"></body></html>"#.to_string(),
    )
    .await;
    mount_html(
        &server,
        "/b",
        r#"<html><body><img src="/assets/icon.png"></body></html>"#.to_string(),
    )
    .await;
    // The response is slow enough that both level-1 pages are in flight
    // before any bytes reach disk; an on-disk check alone would let both
    // through. Exactly one request may hit the wire.
    Mock::given(method("GET"))
        .and(path("/assets/icon.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("pixels")
                .set_delay(Duration::from_millis(250)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = MirrorSession::new(config(&server.uri(), dir.path(), 2))
        .run()
        .await
        .expect("session failed");

    assert_eq!(result.resources_failed(), 0);
    assert_eq!(result.resources_fetched(), 2);
    assert_eq!(
        std::fs::read_to_string(host_dir(&server, dir.path()).join("icon.png")).unwrap(),
        "pixels"
    );
}

#[tokio::test]
async fn test_origin_containment_foreign_host() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_html(
        &server,
        "/",
        r#"<html><body>
        <a href="https://elsewhere.test/page">Offsite</a>
        <a href="https://127.0.0.1.elsewhere.test/">Trap</a>
        <a href="/local">Local</a>
        </body></html>"#
            .to_string(),
    )
    .await;
    mount_html(&server, "/local", "<html></html>".to_string()).await;

    let result = MirrorSession::new(config(&server.uri(), dir.path(), 3))
        .run()
        .await
        .expect("session failed");

    // Only the seed and the local link are visited; foreign hosts (including
    // the substring trap) are never even attempted.
    assert_eq!(result.pages.len(), 2);
    assert!(result
        .pages
        .iter()
        .all(|p| p.url.contains("127.0.0.1")));
}

#[tokio::test]
async fn test_broken_resource_does_not_abort_crawl() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_html(
        &server,
        "/",
        r#"<html><head><script src="/missing.js"></script></head>
        <body><a href="/next">Next</a></body></html>"#
            .to_string(),
    )
    .await;
    mount_html(&server, "/next", "<html></html>".to_string()).await;
    Mock::given(method("GET"))
        .and(path("/missing.js"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = MirrorSession::new(config(&server.uri(), dir.path(), 2))
        .run()
        .await
        .expect("session failed");

    assert_eq!(result.state, EngineState::Completed);
    assert_eq!(result.pages_ok(), 2);
    assert_eq!(result.resources_failed(), 1);
}

#[tokio::test]
async fn test_report_written_to_mirror_root() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_html(&server, "/", "<html><head><title>R</title></head></html>".to_string()).await;

    let result = MirrorSession::new(config(&server.uri(), dir.path(), 1))
        .run()
        .await
        .expect("session failed");
    assert_eq!(result.pages_ok(), 1);

    let report_path = dir.path().join("mirror-report.json");
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(report_path).unwrap()).unwrap();
    assert_eq!(report["state"], "completed");
    assert_eq!(report["pages"][0]["status"], "ok");
}

#[tokio::test]
async fn test_archive_contains_mirror_files() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_html(&server, "/", "<html>zip me</html>".to_string()).await;

    let mut config = config(&server.uri(), dir.path(), 1);
    config.output.archive = true;
    config.output.report = false;

    let result = MirrorSession::new(config).run().await.expect("session failed");

    let archive_path = result.archive_path.expect("archive path missing");
    let bytes = std::fs::read(&archive_path).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 1);
    assert!(archive.by_index(0).unwrap().name().ends_with("index.html"));
}
