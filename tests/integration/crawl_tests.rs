//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive whole
//! requests through `Harvester`, plus a few in-process fetchers for
//! behavior that is awkward to stage over HTTP.

use async_trait::async_trait;
use siteglean::config::{Config, CrawlerConfig, HttpConfig};
use siteglean::crawler::{Crawler, FetchError, Fetcher, PageFetcher, StaticFetcher};
use siteglean::{ApiRequest, ApiResponse, CrawlRequest, CrawlResult, Harvester};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config with the cache disabled so every request hits the mock server
fn uncached_config() -> Config {
    let mut config = Config::default();
    config.cache.enabled = false;
    config
}

/// A static-only request for `url`
fn static_request(url: &str) -> ApiRequest {
    ApiRequest {
        js_render: Some(false),
        wait_time: Some(0),
        timeout: Some(10_000),
        ..ApiRequest::for_url(url)
    }
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body.to_string())
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn expect_crawl(response: ApiResponse) -> CrawlResult {
    match response {
        ApiResponse::Crawl(result) => result,
        other => panic!("Expected crawl result, got {:?}", other),
    }
}

#[tokio::test]
async fn test_full_static_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        &format!(
            r#"<html><head><title>Home</title>
               <meta name="description" content="The home page">
               </head><body><main>
               <h1>Welcome</h1>
               <a href="{}/page1">Page 1</a>
               <a href="/page2">Page 2</a>
               </main></body></html>"#,
            base_url
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/page1",
        "<html><head><title>Page 1</title></head><body><h1>First page</h1></body></html>",
    )
    .await;
    mount_page(
        &mock_server,
        "/page2",
        "<html><head><title>Page 2</title></head><body><h1>Second page</h1></body></html>",
    )
    .await;

    let harvester = Harvester::from_config(&uncached_config()).unwrap();
    let seed = format!("{}/", base_url);
    let result = expect_crawl(harvester.handle(static_request(&seed)).await);

    assert_eq!(
        result.urls,
        vec![
            seed.clone(),
            format!("{}/page1", base_url),
            format!("{}/page2", base_url),
        ]
    );
    assert!(!result.timed_out);

    let titles: Vec<&str> = result.metadata.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Home", "Page 1", "Page 2"]);
    assert_eq!(result.metadata[0].description, "The home page");
    assert_eq!(result.metadata[0].favicon, format!("{}/favicon.ico", base_url));

    assert!(result
        .content
        .starts_with(&format!("=== {} ===\nWelcome", seed)));
    assert!(result
        .content
        .contains(&format!("=== {}/page2 ===\nSecond page", base_url)));

    let json = serde_json::to_value(ApiResponse::Crawl(result)).unwrap();
    assert_eq!(json["metadata"][0]["renderMethod"], "static");
    assert_eq!(json["metadata"][0]["framework"], "static-html");
}

#[tokio::test]
async fn test_depth_bound() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<h1>Root</h1><a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/a",
        r#"<h1>A</h1><a href="/a/1">A1</a><a href="/a/2">A2</a>"#,
    )
    .await;
    mount_page(&mock_server, "/b", "<h1>B</h1>").await;
    mount_page(&mock_server, "/c", "<h1>C</h1>").await;
    Mock::given(method("GET"))
        .and(path("/a/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Too deep</h1>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let harvester = Harvester::from_config(&uncached_config()).unwrap();
    let request = ApiRequest {
        depth: Some(1),
        ..static_request(&format!("{}/", mock_server.uri()))
    };
    let result = expect_crawl(harvester.handle(request).await);

    assert_eq!(result.urls.len(), 4);
    assert!(result.urls.iter().all(|u| !u.contains("/a/")));
}

#[tokio::test]
async fn test_seed_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let harvester = Harvester::from_config(&uncached_config()).unwrap();
    let seed = format!("{}/", mock_server.uri());
    let response = harvester.handle(static_request(&seed)).await;

    assert_eq!(response.status_code(), 200);
    let result = expect_crawl(response);
    assert_eq!(result.urls, vec![seed]);
    assert_eq!(result.content, "");
    assert!(result.metadata.is_empty());
}

#[tokio::test]
async fn test_page_count_bound() {
    let mock_server = MockServer::start().await;

    let links: String = (0..20)
        .map(|i| format!(r#"<a href="/p{}">P{}</a>"#, i, i))
        .collect();
    mount_page(&mock_server, "/", &format!("<h1>Root</h1>{}", links)).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Leaf page</h1>"))
        .mount(&mock_server)
        .await;

    let harvester = Harvester::from_config(&uncached_config()).unwrap();
    let request = ApiRequest {
        max_pages: Some(3),
        ..static_request(&format!("{}/", mock_server.uri()))
    };
    let result = expect_crawl(harvester.handle(request).await);

    assert_eq!(result.urls.len(), 3);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_other_hosts_not_followed() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;
    let other_port = Url::parse(&other_server.uri()).unwrap().port().unwrap();

    mount_page(
        &mock_server,
        "/",
        &format!(
            r#"<h1>Root</h1><a href="http://localhost:{}/">Elsewhere</a><a href="/local">Local</a>"#,
            other_port
        ),
    )
    .await;
    mount_page(&mock_server, "/local", "<h1>Local page</h1>").await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Other</h1>"))
        .expect(0)
        .mount(&other_server)
        .await;

    let harvester = Harvester::from_config(&uncached_config()).unwrap();
    let result = expect_crawl(
        harvester
            .handle(static_request(&format!("{}/", mock_server.uri())))
            .await,
    );

    assert_eq!(result.urls.len(), 2);
    assert!(result.urls.iter().all(|u| u.starts_with(&mock_server.uri())));
}

#[tokio::test]
async fn test_repeat_request_served_from_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Cached page</h1>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let harvester = Harvester::from_config(&Config::default()).unwrap();
    let request = static_request(&format!("{}/", mock_server.uri()));

    let first = harvester.handle(request.clone()).await;
    let second = harvester.handle(request).await;

    assert_eq!(first, second);
    assert_eq!(harvester.cache().map(|c| c.len()), Some(1));
}

#[tokio::test]
async fn test_missing_url() {
    let harvester = Harvester::from_config(&Config::default()).unwrap();

    let response = harvester.handle(ApiRequest::default()).await;

    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        serde_json::json!({"error": "URL is required", "success": false})
    );
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_reachability_check() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let harvester = Harvester::from_config(&uncached_config()).unwrap();

    let ok = harvester
        .handle(ApiRequest {
            test_only: true,
            ..ApiRequest::for_url(format!("{}/", mock_server.uri()))
        })
        .await;
    assert_eq!(
        serde_json::to_value(&ok).unwrap(),
        serde_json::json!({"success": true, "status": 200, "statusText": "OK"})
    );

    let missing = harvester
        .handle(ApiRequest {
            test_only: true,
            ..ApiRequest::for_url(format!("{}/missing", mock_server.uri()))
        })
        .await;
    assert_eq!(
        serde_json::to_value(&missing).unwrap(),
        serde_json::json!({"success": false, "status": 404, "statusText": "Not Found"})
    );
}

#[tokio::test]
async fn test_reachability_network_error() {
    // Bind and drop a listener to get a port nothing listens on
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let harvester = Harvester::from_config(&uncached_config()).unwrap();
    let response = harvester
        .handle(ApiRequest {
            test_only: true,
            ..ApiRequest::for_url(format!("http://127.0.0.1:{}/", port))
        })
        .await;

    assert!(response.is_error());
    assert_eq!(response.status_code(), 502);
}

/// A renderer that never succeeds
struct BrokenRenderer;

#[async_trait]
impl Fetcher for BrokenRenderer {
    async fn fetch(&self, url: &Url, _settle_delay: Duration) -> Result<String, FetchError> {
        Err(FetchError::BrowserLaunch(format!("no browser for {}", url)))
    }
}

#[tokio::test]
async fn test_renderer_failure_falls_back_to_static() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        "<html><head><title>Fallback</title></head><body><h1>Served statically</h1></body></html>",
    )
    .await;

    let static_fetcher = StaticFetcher::from_config(&HttpConfig::default()).unwrap();
    let crawler = Crawler::new(PageFetcher::new(
        Arc::new(static_fetcher),
        Arc::new(BrokenRenderer),
    ));
    let request = CrawlRequest::new(&format!("{}/", mock_server.uri()))
        .unwrap()
        .js_render(true);

    let result = crawler.crawl(&request).await.unwrap();

    assert_eq!(result.metadata.len(), 1);
    assert_eq!(result.metadata[0].title, "Fallback");
    let json = serde_json::to_value(&result.metadata[0]).unwrap();
    assert_eq!(json["renderMethod"], "static");
}

/// An endless site: every page links to the next one after a short delay
struct EndlessSite;

#[async_trait]
impl Fetcher for EndlessSite {
    async fn fetch(&self, url: &Url, _settle_delay: Duration) -> Result<String, FetchError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let n: usize = url
            .path()
            .trim_start_matches("/p")
            .parse()
            .unwrap_or(0);
        Ok(format!(r#"<h1>Page {}</h1><a href="/p{}">next</a>"#, n, n + 1))
    }
}

#[tokio::test]
async fn test_timeout_returns_partial_result() {
    let crawler = Crawler::new(PageFetcher::static_only(Arc::new(EndlessSite)));
    let defaults = CrawlerConfig {
        max_pages: 1_000,
        max_depth: 1_000,
        ..CrawlerConfig::default()
    };
    let request = CrawlRequest::with_defaults("https://endless.test/", &defaults)
        .unwrap()
        .timeout(Duration::from_millis(400))
        .js_render(false);

    let started = Instant::now();
    let result = crawler.crawl(&request).await.unwrap();

    assert!(result.timed_out);
    assert!(!result.urls.is_empty());
    assert!(result.urls.len() < 1_000);
    assert!(result.metadata.len() <= result.urls.len());
    assert!(started.elapsed() < Duration::from_secs(2));
}
