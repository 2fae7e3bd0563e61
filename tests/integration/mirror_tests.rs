//! Integration tests for the mirror engine
//!
//! These tests use wiremock to serve a small site and run the full
//! discovery and mirror cycle end-to-end against a temporary directory.

use site_mirror::config::Config;
use site_mirror::crawler::Coordinator;
use site_mirror::MirrorSummary;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for the given root and output directory
fn create_test_config(root_url: &str, output: &Path) -> Config {
    let mut config = Config::default();
    config.mirror.root_url = root_url.to_string();
    config.mirror.output_directory = output.to_path_buf();
    config.limits.max_parallel_activities = 4;
    config.limits.max_concurrent_requests = 8;
    config.limits.max_retries = 3;
    config.limits.per_request_timeout = 2_000;
    config.limits.retry_delay = 1;
    config.progress.enabled = false;
    config.progress.interval = 5;
    config.progress.quiescence_samples = 3;
    config
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_bytes(server: &MockServer, route: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

/// Serves three pages and three assets; the root also embeds an image from
/// `foreign`, which must never be requested
async fn mount_site(server: &MockServer, foreign: &MockServer) {
    mount_html(
        server,
        "/",
        format!(
            r#"<html><head><title>Home</title><link rel="stylesheet" href="/static/main.css"></head>
<body>
  <img src="/media/logo.png">
  <img src="{}/tracker.gif">
  <a href="/catalogue/page-2/">Page 2</a>
  <a href="https://elsewhere.invalid/">Elsewhere</a>
</body></html>"#,
            foreign.uri()
        ),
    )
    .await;

    mount_html(
        server,
        "/catalogue/page-2/",
        r#"<html><body>
  <a href="../../">Home</a>
  <a href="item.html">Item</a>
  <script src="/static/app.js"></script>
</body></html>"#
            .to_string(),
    )
    .await;

    mount_html(
        server,
        "/catalogue/page-2/item.html",
        r#"<html><body><a href="../page-2/">Back</a><img src="../../media/logo.png"></body></html>"#
            .to_string(),
    )
    .await;

    mount_bytes(server, "/static/main.css", b"body { margin: 0 }").await;
    mount_bytes(server, "/static/app.js", b"console.log(1)").await;
    mount_bytes(server, "/media/logo.png", &[0x89, b'P', b'N', b'G']).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("tracking"))
        .expect(0)
        .mount(foreign)
        .await;
}

async fn run(server: &MockServer, output: &Path) -> MirrorSummary {
    let config = create_test_config(&format!("{}/", server.uri()), output);
    Coordinator::new(config)
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Mirror run failed")
}

async fn requests_for(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == route)
        .count()
}

#[tokio::test]
async fn test_full_mirror_layout() {
    let server = MockServer::start().await;
    let foreign = MockServer::start().await;
    mount_site(&server, &foreign).await;

    let output = TempDir::new().unwrap();
    let summary = run(&server, output.path()).await;

    assert_eq!(summary.pages_discovered, 3);
    assert_eq!(summary.pages_written, 3);
    assert_eq!(summary.assets_written, 3);
    assert_eq!(summary.assets_rejected, 1);
    assert_eq!(summary.failures, 0);
    assert!(summary.is_complete());

    let root = output.path();
    for file in [
        "index.html",
        "catalogue/page-2/index.html",
        "catalogue/page-2/item.html",
        "static/main.css",
        "static/app.js",
        "media/logo.png",
    ] {
        assert!(root.join(file).is_file(), "missing {}", file);
    }
    assert_eq!(
        std::fs::read(root.join("media/logo.png")).unwrap(),
        vec![0x89, b'P', b'N', b'G']
    );
    assert!(!root.join("tracker.gif").exists());

    // Shared assets are fetched once even though two pages use them.
    assert_eq!(requests_for(&server, "/media/logo.png").await, 1);
}

#[tokio::test]
async fn test_second_run_skips_existing_files() {
    let server = MockServer::start().await;
    let foreign = MockServer::start().await;
    mount_site(&server, &foreign).await;

    let output = TempDir::new().unwrap();
    run(&server, output.path()).await;
    let first_run_requests = server.received_requests().await.unwrap_or_default().len();

    let summary = run(&server, output.path()).await;
    let second_run_requests =
        server.received_requests().await.unwrap_or_default().len() - first_run_requests;

    // Only discovery touches the network again.
    assert_eq!(second_run_requests, 3);
    assert_eq!(summary.pages_skipped, 3);
    assert_eq!(summary.pages_written, 0);
    assert_eq!(summary.assets_written, 0);
    assert_eq!(requests_for(&server, "/static/main.css").await, 1);
}

#[tokio::test]
async fn test_missing_pages_leave_a_partial_mirror() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<html><body><a href="/gone/">Gone</a><a href="/here.html">Here</a></body></html>"#
            .to_string(),
    )
    .await;
    mount_html(&server, "/here.html", "<html></html>".to_string()).await;

    let output = TempDir::new().unwrap();
    let summary = run(&server, output.path()).await;

    assert_eq!(summary.pages_discovered, 3);
    assert_eq!(summary.discovery_failures, 1);
    assert_eq!(summary.pages_written, 2);
    assert_eq!(summary.failures, 1);
    assert!(!summary.is_complete());
    assert!(output.path().join("here.html").is_file());
    assert!(!output.path().join("gone").exists());
}

#[tokio::test]
async fn test_timed_out_request_is_retried() {
    let server = MockServer::start().await;

    // Registered first, so it answers the first request only.
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html>slow</html>")
                .set_delay(Duration::from_millis(1_000)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_html(&server, "/", "<html>fast</html>".to_string()).await;

    let output = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/", server.uri()), output.path());
    config.limits.per_request_timeout = 100;

    let summary = Coordinator::new(config).unwrap().run().await.unwrap();
    assert_eq!(summary.discovery_failures, 0);
    assert_eq!(summary.pages_written, 1);
    assert_eq!(summary.requests_issued, 3);
    assert_eq!(
        std::fs::read_to_string(output.path().join("index.html")).unwrap(),
        "<html>fast</html>"
    );
}
