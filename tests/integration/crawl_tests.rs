//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end. A few scenarios run against an
//! in-memory client instead, where they need many pages or exact
//! request counts.

use async_trait::async_trait;
use linkscan::config::{Config, CrawlerConfig, UserAgentConfig};
use linkscan::crawler::{CrawlOptions, Crawler, FetchResponse, HttpClient};
use linkscan::output::CrawlReport;
use linkscan::state::LinkRecord;
use linkscan::url::RootScope;
use linkscan::FetchError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts
fn create_test_config(concurrency: usize) -> Config {
    Config {
        crawler: CrawlerConfig {
            concurrency,
            request_timeout_secs: 1,
            connect_timeout_secs: 1,
            max_redirects: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: None,
        },
    }
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.into())
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, route: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn run(root_url: &str, concurrency: usize) -> CrawlReport {
    Crawler::from_config(root_url, &create_test_config(concurrency))
        .expect("Failed to create crawler")
        .crawl()
        .await
        .expect("Crawl failed")
}

fn record(url: String, parent: &str) -> LinkRecord {
    LinkRecord::new(url, Some(parent.to_string()))
}

#[tokio::test]
async fn test_full_crawl_classifies_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let root = format!("{}/", base_url);

    mount_page(
        &mock_server,
        "/",
        html(r#"<html><body><a href="/ok">ok</a> <a href="/missing">gone</a></body></html>"#),
    )
    .await;
    mount_page(&mock_server, "/ok", html("<html><body>fine</body></html>")).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = run(&base_url, 4).await;

    assert!(!report.interrupted);
    assert_eq!(report.root_url, root);
    assert_eq!(report.total_links(), 3);
    assert_eq!(
        report.succeeded,
        vec![
            LinkRecord::new(root.clone(), None),
            record(format!("{}/ok", base_url), &root),
        ]
    );
    assert_eq!(report.failed, vec![record(format!("{}/missing", base_url), &root)]);
    assert!(report.errored.is_empty());
}

#[tokio::test]
async fn test_out_of_scope_links_are_never_fetched() {
    let site = MockServer::start().await;
    let elsewhere = MockServer::start().await;
    let base_url = site.uri();

    mount_page(
        &site,
        "/",
        html(format!(
            r#"<a href="{}/external">external</a> <a href="/inside">inside</a>"#,
            elsewhere.uri()
        )),
    )
    .await;
    mount_page(&site, "/inside", html("<p>inside</p>")).await;
    Mock::given(method("GET"))
        .respond_with(html("<p>external</p>"))
        .expect(0)
        .mount(&elsewhere)
        .await;

    let report = run(&base_url, 2).await;

    assert_eq!(report.total_links(), 2);
    assert!(report
        .visited
        .iter()
        .all(|url| url.starts_with(&report.root_url)));
}

#[tokio::test]
async fn test_root_path_prefix_limits_scope() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let root = format!("{}/docs/", base_url);

    mount_page(
        &mock_server,
        "/docs/",
        html(r#"<a href="guide">guide</a> <a href="/blog">blog</a> <a href="/docs-old">old</a>"#),
    )
    .await;
    mount_page(&mock_server, "/docs/guide", html("<p>guide</p>")).await;
    for outside in ["/blog", "/docs-old"] {
        Mock::given(method("GET"))
            .and(path(outside))
            .respond_with(html("<p>outside</p>"))
            .expect(0)
            .mount(&mock_server)
            .await;
    }

    let report = run(&root, 3).await;

    assert_eq!(
        report.visited,
        vec![root.clone(), format!("{}/docs/guide", base_url)]
    );
    assert!(report.failed.is_empty());
}

#[tokio::test]
async fn test_shared_link_is_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        html(r#"<a href="/a">a</a> <a href="/b">b</a> <a href="/shared#top">shared</a>"#),
    )
    .await;
    mount_page(&mock_server, "/a", html(r#"<a href="/shared">shared</a>"#)).await;
    mount_page(&mock_server, "/b", html(r#"<a href="/shared#bottom">shared</a>"#)).await;
    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(html(r#"<a href="/">home</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = run(&base_url, 8).await;

    assert_eq!(report.total_links(), 4);
    assert_eq!(report.succeeded.len(), 4);
}

#[tokio::test]
async fn test_redirects_and_non_html_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let root = format!("{}/", base_url);

    mount_page(
        &mock_server,
        "/",
        html(r#"<a href="/old">old</a> <img src="/logo.png">"#),
    )
    .await;
    mount_page(
        &mock_server,
        "/old",
        ResponseTemplate::new(301).insert_header("location", format!("{}/new", base_url).as_str()),
    )
    .await;
    mount_page(&mock_server, "/new", html("<p>moved here</p>")).await;
    mount_page(
        &mock_server,
        "/logo.png",
        ResponseTemplate::new(200)
            .set_body_string(r#"<a href="/never">not html</a>"#)
            .insert_header("content-type", "image/png"),
    )
    .await;

    let report = run(&base_url, 2).await;

    assert!(report
        .succeeded
        .contains(&record(format!("{}/new", base_url), &root)));
    assert!(report
        .succeeded
        .contains(&record(format!("{}/logo.png", base_url), &root)));
    assert!(report.visited.contains(&format!("{}/old", base_url)));
    assert!(!report.visited.contains(&format!("{}/never", base_url)));
}

#[tokio::test]
async fn test_failed_root_ends_crawl() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let report = run(&mock_server.uri(), 4).await;

    assert_eq!(report.total_links(), 1);
    assert!(report.succeeded.is_empty());
    assert_eq!(
        report.failed,
        vec![LinkRecord::new(format!("{}/", mock_server.uri()), None)]
    );
}

#[tokio::test]
async fn test_slow_page_is_recorded_as_errored() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", html(r#"<a href="/slow">slow</a>"#)).await;
    mount_page(
        &mock_server,
        "/slow",
        html("<p>late</p>").set_delay(Duration::from_secs(3)),
    )
    .await;

    let report = run(&base_url, 2).await;

    assert_eq!(report.total_links(), 2);
    assert_eq!(report.succeeded.len(), 1);
    assert!(report.failed.is_empty());
    assert_eq!(report.errored.len(), 1);
    assert_eq!(report.errored[0].url, format!("{}/slow", base_url));
}

/// Serves an HTML page that promises more bytes than it sends, then hangs up
async fn serve_truncated_page() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let root = format!("http://{}/", listener.local_addr().unwrap());

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\n\
                      content-type: text/html\r\n\
                      content-length: 5000\r\n\r\n\
                      <html><body><a href=\"/a\">",
                )
                .await;
            let _ = socket.shutdown().await;
        }
    });

    root
}

#[tokio::test]
async fn test_truncated_body_still_counts_as_succeeded() {
    let root = serve_truncated_page().await;

    let report = run(&root, 2).await;

    assert_eq!(report.visited, vec![root.clone()]);
    assert_eq!(report.succeeded, vec![LinkRecord::new(root, None)]);
    assert!(report.failed.is_empty());
    assert!(report.errored.is_empty());
}

/// Generated site served from memory
///
/// Page `n` links to pages `2n+1` and `2n+2` and back to the root. Pages
/// whose index is a multiple of seven answer 404.
struct TreeSite {
    pages: usize,
    requests: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl TreeSite {
    fn new(pages: usize) -> Self {
        Self {
            pages,
            requests: Mutex::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    fn index_of(url: &str) -> Option<usize> {
        let tail = url.strip_prefix("https://tree.test/")?;
        if tail.is_empty() {
            Some(0)
        } else {
            tail.strip_prefix('p')?.parse().ok()
        }
    }
}

#[async_trait]
impl HttpClient for TreeSite {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        *self
            .requests
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default() += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(2)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let response = match Self::index_of(url) {
            Some(n) if n < self.pages && (n == 0 || n % 7 != 0) => {
                let body = format!(
                    r#"<a href="/p{}">l</a><a href="/p{}">r</a><a href="/">home</a>"#,
                    2 * n + 1,
                    2 * n + 2
                );
                FetchResponse {
                    status: 200,
                    content_type: Some("text/html".to_string()),
                    final_url: url.to_string(),
                    body: Some(body),
                    body_error: None,
                }
            }
            _ => FetchResponse {
                status: 404,
                content_type: None,
                final_url: url.to_string(),
                body: None,
                body_error: None,
            },
        };
        Ok(response)
    }
}

async fn crawl_tree(pages: usize, concurrency: usize) -> (CrawlReport, Arc<TreeSite>) {
    let site = Arc::new(TreeSite::new(pages));
    let crawler = Crawler::new(
        RootScope::new("tree.test").unwrap(),
        site.clone(),
        CrawlOptions { concurrency },
    )
    .unwrap();
    let report = crawler.crawl().await.unwrap();
    (report, site)
}

#[tokio::test]
async fn test_result_is_independent_of_concurrency() {
    let (serial, _) = crawl_tree(200, 1).await;
    let (parallel, _) = crawl_tree(200, 50).await;

    assert_eq!(serial.visited, parallel.visited);
    assert_eq!(serial.succeeded, parallel.succeeded);
    assert_eq!(serial.failed, parallel.failed);
    assert!(!serial.failed.is_empty());
}

#[tokio::test]
async fn test_every_url_fetched_at_most_once() {
    let (report, site) = crawl_tree(300, 32).await;

    let requests = site.requests.lock().unwrap();
    assert_eq!(requests.len(), report.total_links());
    assert!(requests.values().all(|&count| count == 1));
}

#[tokio::test]
async fn test_drain_classifies_every_visited_url() {
    let (report, site) = crawl_tree(150, 10).await;

    assert!(!report.interrupted);
    assert_eq!(
        report.succeeded.len() + report.failed.len() + report.errored.len(),
        report.total_links()
    );
    assert!(site.peak_in_flight.load(Ordering::SeqCst) <= 10);
}

#[tokio::test]
async fn test_single_worker_never_overlaps_requests() {
    let (report, site) = crawl_tree(40, 1).await;

    assert!(report.total_links() > 1);
    assert_eq!(site.peak_in_flight.load(Ordering::SeqCst), 1);
}
