//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use driftnet::config::{Config, ParserStrategy};
use driftnet::output::{LogSink, MemorySink, RunSummary, TsvLogSink, VisitRecord};
use driftnet::{crawl, Coordinator, CrawlerError};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with robots disabled and a short timeout
fn create_test_config(threads: usize, max_pages: u64) -> Config {
    let mut config = Config::default();
    config.crawler.threads = threads;
    config.crawler.max_pages = max_pages;
    config.crawler.respect_robots = false;
    config.crawler.timeout_secs = 2.0;
    config
}

/// Builds an HTML page linking to each of `links`
fn links_page(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|link| format!("<a href=\"{}\">{}</a>\n", link, link))
        .collect();
    format!("<html><head><title>Test</title></head><body>\n{}</body></html>", anchors)
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

async fn mount_never(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(links_page(&[]), "text/html"))
        .expect(0)
        .mount(server)
        .await;
}

/// Runs a crawl from the server root into an in-memory sink
async fn run_from_root(server: &MockServer, config: Config) -> (RunSummary, Vec<VisitRecord>) {
    let sink = Arc::new(MemorySink::new());
    let seeds = vec![format!("{}/", server.uri())];

    let summary = crawl(config, &seeds, sink.clone())
        .await
        .expect("crawl should succeed");

    (summary, sink.records())
}

fn record_for<'a>(records: &'a [VisitRecord], route: &str) -> Option<&'a VisitRecord> {
    records.iter().find(|r| r.url.ends_with(route))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_page_budget_exact_for_any_worker_count() {
    for threads in [1, 2, 4, 8, 16] {
        let server = MockServer::start().await;

        let children: Vec<String> = (0..10).map(|i| format!("/p{}", i)).collect();
        let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();
        mount_html(&server, "/", links_page(&child_refs)).await;

        Mock::given(method("GET"))
            .and(path_regex(r"^/p\d+$"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(links_page(&[]), "text/html"))
            .mount(&server)
            .await;

        let (summary, records) = run_from_root(&server, create_test_config(threads, 3)).await;

        let unique: HashSet<&str> = records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(records.len(), 3, "{} workers emitted {} records", threads, records.len());
        assert_eq!(unique.len(), 3, "{} workers repeated a URL", threads);
        assert_eq!(summary.pages_crawled, 3);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_breadth_first_order_single_worker() {
    let server = MockServer::start().await;
    mount_html(&server, "/", links_page(&["/a", "/b"])).await;
    mount_html(&server, "/a", links_page(&["/a/deep"])).await;
    mount_html(&server, "/b", links_page(&[])).await;
    mount_html(&server, "/a/deep", links_page(&[])).await;

    let (_, records) = run_from_root(&server, create_test_config(1, 100)).await;

    let depths: Vec<u32> = records.iter().map(|r| r.depth).collect();
    assert_eq!(depths, vec![0, 1, 1, 2]);
    assert!(records[3].url.ends_with("/a/deep"));

    // Priorities are non-decreasing across depth levels
    assert!(records[0].priority < records[1].priority);
    assert!(records[2].priority < records[3].priority);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_robots_disallow_respected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin\n"))
        .expect(1)
        .mount(&server)
        .await;

    mount_html(&server, "/", links_page(&["/admin", "/public"])).await;
    mount_html(&server, "/public", links_page(&[])).await;
    mount_never(&server, "/admin").await;

    let mut config = create_test_config(4, 100);
    config.crawler.respect_robots = true;
    let (summary, records) = run_from_root(&server, config).await;

    assert_eq!(records.len(), 2);
    assert!(record_for(&records, "/public").is_some());
    assert!(record_for(&records, "/admin").is_none());
    assert_eq!(summary.pages_crawled, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_robots_denial_under_full_budget_keeps_crawling() {
    let server = MockServer::start().await;
    let port = server.address().port();

    // Slow enough that every unit of the budget is claimed before the
    // first denial comes back
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: *\nDisallow: /p0\n")
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let children: Vec<String> = (0..10)
        .map(|i| format!("http://localhost:{}/p{}", port, i))
        .collect();
    let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();
    mount_html(&server, "/", links_page(&child_refs)).await;
    mount_never(&server, "/p0").await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/p[1-9]$"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(links_page(&[]), "text/html"))
        .mount(&server)
        .await;

    let mut config = create_test_config(16, 3);
    config.crawler.respect_robots = true;
    let (summary, records) = run_from_root(&server, config).await;

    let unique: HashSet<&str> = records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(summary.pages_crawled, 3);
    assert_eq!(records.len(), 3);
    assert_eq!(unique.len(), 3);
    assert!(record_for(&records, "/p0").is_none());
    assert_eq!(
        records.iter().filter(|r| r.url.contains("localhost")).count(),
        2
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_robots_failure_allows_everything() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    mount_html(&server, "/", links_page(&["/a", "/b"])).await;
    mount_html(&server, "/a", links_page(&[])).await;
    mount_html(&server, "/b", links_page(&[])).await;

    let mut config = create_test_config(4, 100);
    config.crawler.respect_robots = true;
    let (_, records) = run_from_root(&server, config).await;

    assert_eq!(records.len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_robots_ignored_when_disabled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /\n"))
        .expect(0)
        .mount(&server)
        .await;
    mount_html(&server, "/", links_page(&[])).await;

    let (_, records) = run_from_root(&server, create_test_config(2, 100)).await;
    assert_eq!(records.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_depth_limit() {
    let server = MockServer::start().await;
    mount_html(&server, "/", links_page(&["/d1"])).await;
    mount_html(&server, "/d1", links_page(&["/d2"])).await;
    mount_never(&server, "/d2").await;

    let mut config = create_test_config(2, 100);
    config.crawler.max_depth = 1;
    let (_, records) = run_from_root(&server, config).await;

    assert_eq!(records.len(), 2);
    assert_eq!(record_for(&records, "/d1").map(|r| r.depth), Some(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_zero_depth_fetches_only_seeds() {
    let server = MockServer::start().await;
    mount_html(&server, "/", links_page(&["/child"])).await;
    mount_never(&server, "/child").await;

    let mut config = create_test_config(2, 100);
    config.crawler.max_depth = 0;
    let (_, records) = run_from_root(&server, config).await;

    assert_eq!(records.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_host_backoff_after_repeated_failures() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        links_page(&["/f0", "/f1", "/f2", "/f3", "/f4", "/hub"]),
    )
    .await;
    for i in 0..5 {
        mount_status(&server, &format!("/f{}", i), 500).await;
    }
    mount_html(&server, "/hub", links_page(&["/late"])).await;
    mount_never(&server, "/late").await;

    let (_, records) = run_from_root(&server, create_test_config(1, 100)).await;

    assert_eq!(records.len(), 7);
    let hub = record_for(&records, "/hub").expect("hub should be fetched");
    assert_eq!(hub.status, 200);
    assert_eq!(
        records.iter().filter(|r| r.status == 500).count(),
        5
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fetch_timeout_recorded_as_status_zero() {
    let server = MockServer::start().await;
    mount_html(&server, "/", links_page(&["/slow"])).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(links_page(&[]), "text/html")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = create_test_config(2, 100);
    config.crawler.timeout_secs = 0.3;
    let (summary, records) = run_from_root(&server, config).await;

    let slow = record_for(&records, "/slow").expect("slow page should be logged");
    assert_eq!(slow.status, 0);
    assert_eq!(slow.bytes, 0);
    assert_eq!(summary.pages_crawled, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_html_truncated_at_cap() {
    let server = MockServer::start().await;

    let body = format!(
        "<html><body><a href=\"/head\">head</a>{}<a href=\"/tail\">tail</a></body></html>",
        "<p>padding</p>".repeat(2000)
    );
    let body_len = body.len() as u64;
    mount_html(&server, "/", body).await;
    mount_html(&server, "/head", links_page(&[])).await;
    mount_never(&server, "/tail").await;

    let mut config = create_test_config(2, 100);
    config.content.max_html_bytes = 1024;
    let (_, records) = run_from_root(&server, config).await;

    let root = &records[0];
    assert!(root.metrics.truncated);
    assert_eq!(root.bytes, body_len);
    assert_eq!(root.metrics.links_found, 1);
    assert!(record_for(&records, "/head").is_some());
    assert!(!record_for(&records, "/head").unwrap().metrics.truncated);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_non_html_not_parsed() {
    let server = MockServer::start().await;
    mount_html(&server, "/", links_page(&["/download"])).await;

    let payload = format!("<a href=\"/hidden\">x</a>{}", "0".repeat(10_000));
    let payload_len = payload.len() as u64;
    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(payload, "application/octet-stream"))
        .mount(&server)
        .await;
    mount_never(&server, "/hidden").await;

    let (_, records) = run_from_root(&server, create_test_config(2, 100)).await;

    let download = record_for(&records, "/download").expect("download should be logged");
    assert_eq!(download.bytes, payload_len);
    assert_eq!(download.metrics.links_found, 0);
    assert_eq!(records.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_status_tallies() {
    let server = MockServer::start().await;
    mount_html(&server, "/", links_page(&["/missing", "/forbidden", "/photo.png"])).await;
    mount_status(&server, "/missing", 404).await;
    mount_status(&server, "/forbidden", 403).await;
    mount_never(&server, "/photo.png").await;

    let (summary, records) = run_from_root(&server, create_test_config(2, 100)).await;

    assert_eq!(records.len(), 3);
    assert_eq!(summary.not_found, 1);
    assert_eq!(summary.forbidden, 1);
    assert_eq!(record_for(&records, "/missing").map(|r| r.bytes), Some(0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_robust_parser_end_to_end() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        "<html><body><div><a href=\"/one#frag\">one<p><a href='/two'>two</div>".to_string(),
    )
    .await;
    mount_html(&server, "/one", links_page(&[])).await;
    mount_html(&server, "/two", links_page(&[])).await;

    let mut config = create_test_config(2, 100);
    config.content.parser = ParserStrategy::Robust;
    let (_, records) = run_from_root(&server, config).await;

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].metrics.links_enqueued, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_tsv_log_written() {
    let server = MockServer::start().await;
    mount_html(&server, "/", links_page(&["/next"])).await;
    mount_html(&server, "/next", links_page(&[])).await;

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("run.tsv");
    let sink: Arc<dyn LogSink> = Arc::new(TsvLogSink::create(&log_path, true).unwrap());

    let mut config = create_test_config(1, 100);
    config.output.debug_metrics = true;
    let seeds = vec![format!("{}/", server.uri())];
    let summary = crawl(config, &seeds, sink).await.unwrap();
    assert_eq!(summary.pages_crawled, 2);

    let content = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();

    assert!(lines[0].starts_with("timestamp\turl\tstatus\tbytes\tdepth\tpriority"));
    assert!(lines[0].ends_with("html_truncated"));

    let first: Vec<&str> = lines[1].split('\t').collect();
    assert_eq!(first.len(), 18);
    assert_eq!(first[1], seeds[0]);
    assert_eq!(first[2], "200");
    assert_eq!(first[4], "0");
    assert_eq!(first[7], "1");
    assert_eq!(first[15], "1");
    assert_eq!(first[16], "1");
    assert_eq!(first[17], "0");

    assert_eq!(lines[3], "");
    assert_eq!(lines[4], "STAT\tpages_crawled\t2");
    assert!(lines.iter().any(|l| l.starts_with("STAT\trate_pages_per_sec\t")));
    assert_eq!(lines.last().copied(), Some("STAT\tnum_403\t0"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_stop_handle_halts_crawl() {
    let server = MockServer::start().await;

    let children: Vec<String> = (0..50).map(|i| format!("/s{}", i)).collect();
    let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();
    mount_html(&server, "/", links_page(&child_refs)).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/s\d+$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(links_page(&[]), "text/html")
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let coordinator = Coordinator::new(create_test_config(2, 1000), sink.clone()).unwrap();
    coordinator.seed(&[format!("{}/", server.uri())]);
    let stop = coordinator.stop_handle();

    let run = tokio::spawn(coordinator.run());
    tokio::time::sleep(Duration::from_millis(400)).await;
    stop.stop();

    let summary = run.await.unwrap().unwrap();
    assert!(summary.pages_crawled < 10);
    assert_eq!(sink.records().len() as u64, summary.pages_crawled);
    assert!(sink.summary().is_some());
}

#[tokio::test]
async fn test_crawl_without_usable_seeds() {
    let sink = Arc::new(MemorySink::new());
    let result = crawl(
        create_test_config(1, 10),
        &["https://example.com/logo.png"],
        sink,
    )
    .await;
    assert!(matches!(result, Err(CrawlerError::NoSeeds)));
}
