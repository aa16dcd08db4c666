//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test the full
//! crawl cycle end-to-end, plus an instrumented in-memory fetcher for the
//! concurrency, depth and cancellation properties.

use async_trait::async_trait;
use prowl::config::{Config, CrawlerConfig, OutputConfig};
use prowl::crawler::{run_crawl, Crawler, PageFetcher, Product};
use prowl::{is_product_url, CrawlError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with a fast pace
fn create_test_config(max_depth: u32) -> CrawlerConfig {
    CrawlerConfig {
        max_depth,
        rate_limit_ms: 10,
        max_concurrent_workers: 4,
        request_timeout_ms: 5_000,
        ..CrawlerConfig::default()
    }
}

/// Builds an HTML page containing one anchor per href
fn page(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    format!("<html><body>{}</body></html>", anchors)
}

/// Mounts an HTML page at `route`, optionally asserting how often it is requested
async fn mount_page(server: &MockServer, route: &str, body: String, expected: Option<u64>) {
    let mock = Mock::given(method("GET")).and(path(route)).respond_with(
        ResponseTemplate::new(200)
            .set_body_string(body)
            .insert_header("content-type", "text/html"),
    );

    match expected {
        Some(times) => mock.expect(times).mount(server).await,
        None => mock.mount(server).await,
    }
}

fn product_urls(products: &[Product]) -> HashSet<String> {
    products.iter().map(|p| p.url.clone()).collect()
}

#[tokio::test]
async fn test_seed_product_with_zero_depth() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/product/1", page(&["/product/2"]), Some(1)).await;
    mount_page(&mock_server, "/product/2", page(&[]), Some(0)).await;

    let seed = format!("{}/product/1", mock_server.uri());
    let crawler = Crawler::new(create_test_config(0)).expect("Failed to build crawler");
    let result = crawler.crawl(&seed, &CancellationToken::new()).await;

    assert_eq!(result.domain, seed);
    assert_eq!(result.products, vec![Product { url: seed.clone() }]);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_depth_one_excludes_deeper_products() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        page(&[
            "/product/1",
            "/product/2",
            &format!("{}/item/3", base_url),
            "/category/a",
            "category/b",
        ]),
        Some(1),
    )
    .await;
    for route in ["/product/1", "/product/2", "/item/3"] {
        mount_page(&mock_server, route, page(&[]), Some(1)).await;
    }
    mount_page(&mock_server, "/category/a", page(&["/product/10"]), Some(1)).await;
    mount_page(&mock_server, "/category/b", page(&["/product/11"]), Some(1)).await;

    // Depth 2: must never be requested
    mount_page(&mock_server, "/product/10", page(&[]), Some(0)).await;
    mount_page(&mock_server, "/product/11", page(&[]), Some(0)).await;

    let crawler = Crawler::new(create_test_config(1)).expect("Failed to build crawler");
    let result = crawler
        .crawl(&format!("{}/", base_url), &CancellationToken::new())
        .await;

    let expected: HashSet<String> = ["/product/1", "/product/2", "/item/3"]
        .iter()
        .map(|route| format!("{}{}", base_url, route))
        .collect();
    assert_eq!(product_urls(&result.products), expected);
    assert_eq!(result.products.len(), 3);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_duplicate_anchor_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        page(&[
            "/product/1",
            &format!("{}/product/1", base_url),
            "/product/1",
        ]),
        Some(1),
    )
    .await;
    mount_page(&mock_server, "/product/1", page(&["/"]), Some(1)).await;

    let crawler = Crawler::new(create_test_config(2)).expect("Failed to build crawler");
    let result = crawler
        .crawl(&format!("{}/", base_url), &CancellationToken::new())
        .await;

    assert_eq!(result.products.len(), 1);
}

#[tokio::test]
async fn test_branch_404_does_not_surface() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        page(&["/product/1", "/product/missing", "/product/2"]),
        None,
    )
    .await;
    mount_page(&mock_server, "/product/1", page(&[]), None).await;
    mount_page(&mock_server, "/product/2", page(&[]), None).await;
    Mock::given(method("GET"))
        .and(path("/product/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let crawler = Crawler::new(create_test_config(1)).expect("Failed to build crawler");
    let result = crawler
        .crawl(&format!("{}/", mock_server.uri()), &CancellationToken::new())
        .await;

    assert!(result.error.is_none());
    assert!(result.branch_errors.is_empty());
    assert_eq!(result.products.len(), 2);
    assert!(!result.contains_product(&format!("{}/product/missing", mock_server.uri())));
}

#[tokio::test]
async fn test_root_404_surfaces() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let crawler = Crawler::new(create_test_config(1)).expect("Failed to build crawler");
    let result = crawler
        .crawl(
            &format!("{}/product/missing", mock_server.uri()),
            &CancellationToken::new(),
        )
        .await;

    assert!(matches!(
        result.error,
        Some(CrawlError::Status { status: 404, .. })
    ));
    assert!(result.products.is_empty());
}

#[tokio::test]
async fn test_branch_errors_collected_when_enabled() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", page(&["/gone", "/product/1"]), None).await;
    mount_page(&mock_server, "/product/1", page(&[]), None).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&mock_server)
        .await;

    let config = CrawlerConfig {
        collect_branch_errors: true,
        ..create_test_config(1)
    };
    let crawler = Crawler::new(config).expect("Failed to build crawler");
    let result = crawler
        .crawl(&format!("{}/", mock_server.uri()), &CancellationToken::new())
        .await;

    assert!(result.error.is_none());
    assert_eq!(result.branch_errors.len(), 1);
    assert_eq!(
        result.branch_errors[0].url,
        format!("{}/gone", mock_server.uri())
    );
    assert!(matches!(
        result.branch_errors[0].error,
        CrawlError::Status { status: 410, .. }
    ));
    assert_eq!(result.products.len(), 1);
}

#[tokio::test]
async fn test_identifying_user_agent_sent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", prowl::config::DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(&[])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let crawler = Crawler::new(create_test_config(0)).expect("Failed to build crawler");
    let result = crawler
        .crawl(&format!("{}/", mock_server.uri()), &CancellationToken::new())
        .await;

    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_cancel_mid_crawl_keeps_partial_result() {
    let mock_server = MockServer::start().await;
    let hrefs: Vec<String> = (1..=5).map(|i| format!("/product/{}", i)).collect();
    let href_refs: Vec<&str> = hrefs.iter().map(String::as_str).collect();

    mount_page(&mock_server, "/products/featured", page(&href_refs), Some(1)).await;
    Mock::given(method("GET"))
        .and(path("/product/1"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&mock_server)
        .await;
    for i in 2..=5 {
        Mock::given(method("GET"))
            .and(path(format!("/product/{}", i)))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
            .mount(&mock_server)
            .await;
    }

    let config = CrawlerConfig {
        max_concurrent_workers: 2,
        request_timeout_ms: 30_000,
        ..create_test_config(1)
    };
    let crawler = Crawler::new(config).expect("Failed to build crawler");
    let seed = format!("{}/products/featured", mock_server.uri());

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let result = crawler.crawl(&seed, &cancel).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(result.error, Some(CrawlError::Cancelled));
    assert_eq!(result.products, vec![Product { url: seed }]);
}

#[tokio::test]
async fn test_cancelled_before_start_fetches_nothing() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", page(&[]), Some(0)).await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let crawler = Crawler::new(create_test_config(1)).expect("Failed to build crawler");
    let result = crawler
        .crawl(&format!("{}/", mock_server.uri()), &cancel)
        .await;

    assert_eq!(result.error, Some(CrawlError::Cancelled));
    assert!(result.products.is_empty());
}

#[tokio::test]
async fn test_rate_pause_applied_before_fetch() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", page(&[]), Some(1)).await;

    let config = CrawlerConfig {
        rate_limit_ms: 200,
        ..create_test_config(0)
    };
    let crawler = Crawler::new(config).expect("Failed to build crawler");

    let started = Instant::now();
    crawler
        .crawl(&format!("{}/", mock_server.uri()), &CancellationToken::new())
        .await;

    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn test_run_crawl_writes_result_file() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/shop/", page(&["/product/1"]), None).await;
    mount_page(&mock_server, "/product/1", page(&[]), None).await;
    Mock::given(method("GET"))
        .and(path("/down/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let result_path = dir.path().join("crawler_result.json");

    let config = Config {
        crawler: create_test_config(1),
        output: OutputConfig {
            result_path: result_path.to_string_lossy().into_owned(),
        },
        seeds: vec![
            format!("{}/shop/", mock_server.uri()),
            format!("{}/down/", mock_server.uri()),
        ],
        run_timeout_secs: 60,
    };

    let results = run_crawl(config, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(results.len(), 2);
    assert_eq!(results[&0].products.len(), 1);
    assert!(results[&0].error.is_none());
    assert!(matches!(
        results[&1].error,
        Some(CrawlError::Status { status: 503, .. })
    ));

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&result_path).unwrap()).unwrap();
    assert_eq!(
        written["0"]["products"][0]["url"],
        format!("{}/product/1", mock_server.uri())
    );
    assert_eq!(written["1"]["domain"], format!("{}/down/", mock_server.uri()));
    assert!(written["1"]["error"].as_str().unwrap().contains("503"));
}

/// In-memory site that records every fetch and tracks in-flight concurrency
struct InstrumentedSite {
    pages: HashMap<String, String>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    started: AtomicUsize,
    cancel_after: Option<usize>,
    fetch_counts: Mutex<HashMap<String, usize>>,
}

impl InstrumentedSite {
    fn new(pages: HashMap<String, String>, delay: Duration) -> Self {
        Self {
            pages,
            delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            started: AtomicUsize::new(0),
            cancel_after: None,
            fetch_counts: Mutex::new(HashMap::new()),
        }
    }

    /// Raises the run's cancellation signal from inside the n-th fetch
    fn cancel_after(mut self, fetches: usize) -> Self {
        self.cancel_after = Some(fetches);
        self
    }

    fn fetch_counts(&self) -> HashMap<String, usize> {
        self.fetch_counts.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for InstrumentedSite {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<Vec<u8>, CrawlError> {
        let started = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        *self
            .fetch_counts
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if self.cancel_after == Some(started) {
            cancel.cancel();
        }

        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.pages.get(url) {
            Some(body) => Ok(body.clone().into_bytes()),
            None => Err(CrawlError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// A shop whose home page links to `count` products that all link to each other
fn interlinked_shop(count: usize) -> HashMap<String, String> {
    let product_refs: Vec<String> = (0..count).map(|i| format!("/product/{}", i)).collect();
    let refs: Vec<&str> = product_refs.iter().map(String::as_str).collect();

    let mut pages = HashMap::new();
    pages.insert("https://shop.test/".to_string(), page(&refs));
    for i in 0..count {
        pages.insert(
            format!("https://shop.test/product/{}", i),
            page(&[
                "/",
                &format!("/product/{}", (i + 1) % count),
                &format!("https://shop.test/product/{}", (i + 7) % count),
            ]),
        );
    }
    pages
}

#[tokio::test]
async fn test_concurrency_bound_and_no_duplicate_fetch() {
    let site = Arc::new(InstrumentedSite::new(
        interlinked_shop(30),
        Duration::from_millis(20),
    ));
    let config = CrawlerConfig {
        max_concurrent_workers: 3,
        rate_limit_ms: 0,
        ..create_test_config(2)
    };
    let crawler = Crawler::with_fetcher(config, site.clone()).expect("Failed to build crawler");

    let result = crawler
        .crawl("https://shop.test/", &CancellationToken::new())
        .await;

    let max_in_flight = site.max_in_flight.load(Ordering::SeqCst);
    assert!(max_in_flight <= 3, "saw {} concurrent fetches", max_in_flight);
    assert!(max_in_flight >= 1);

    let counts = site.fetch_counts();
    assert_eq!(counts.len(), 31);
    assert!(counts.values().all(|&n| n == 1), "duplicate fetch: {:?}", counts);

    assert_eq!(result.products.len(), 30);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_products_were_fetched_and_match() {
    let mut pages = interlinked_shop(5);
    pages.insert(
        "https://shop.test/about".to_string(),
        page(&["/product/0"]),
    );
    let site = Arc::new(InstrumentedSite::new(pages, Duration::ZERO));
    let config = create_test_config(3);
    let patterns = config.product_url_patterns.clone();
    let crawler = Crawler::with_fetcher(config, site.clone()).expect("Failed to build crawler");

    let result = crawler
        .crawl("https://shop.test/", &CancellationToken::new())
        .await;

    let counts = site.fetch_counts();
    assert!(!result.products.is_empty());
    for product in &result.products {
        assert!(counts.contains_key(&product.url), "{} never fetched", product.url);
        assert!(is_product_url(&product.url, &patterns));
    }
    assert!(!result.contains_product("https://shop.test/"));
}

#[tokio::test]
async fn test_depth_bound_on_chain() {
    let pages: HashMap<String, String> = [
        ("https://shop.test/a", page(&["/b"])),
        ("https://shop.test/b", page(&["/c"])),
        ("https://shop.test/c", page(&["/d"])),
        ("https://shop.test/d", page(&["/e"])),
    ]
    .into_iter()
    .map(|(url, body)| (url.to_string(), body))
    .collect();
    let site = Arc::new(InstrumentedSite::new(pages, Duration::ZERO));
    let crawler =
        Crawler::with_fetcher(create_test_config(2), site.clone()).expect("Failed to build crawler");

    let result = crawler
        .crawl("https://shop.test/a", &CancellationToken::new())
        .await;

    let fetched: HashSet<String> = site.fetch_counts().into_keys().collect();
    let expected: HashSet<String> = ["https://shop.test/a", "https://shop.test/b", "https://shop.test/c"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(fetched, expected);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_no_fetch_starts_after_cancellation() {
    let pages = interlinked_shop(10);
    let site = Arc::new(InstrumentedSite::new(pages, Duration::from_millis(5)).cancel_after(2));
    let config = CrawlerConfig {
        max_concurrent_workers: 1,
        rate_limit_ms: 0,
        ..create_test_config(2)
    };
    let crawler = Crawler::with_fetcher(config, site.clone()).expect("Failed to build crawler");

    let result = crawler
        .crawl("https://shop.test/", &CancellationToken::new())
        .await;

    assert_eq!(site.started.load(Ordering::SeqCst), 2);
    assert_eq!(result.error, Some(CrawlError::Cancelled));
}

#[tokio::test]
async fn test_every_run_starts_fresh() {
    let site = Arc::new(InstrumentedSite::new(interlinked_shop(3), Duration::ZERO));
    let crawler =
        Crawler::with_fetcher(create_test_config(1), site.clone()).expect("Failed to build crawler");

    let first = crawler
        .crawl("https://shop.test/", &CancellationToken::new())
        .await;
    let second = crawler
        .crawl("https://shop.test/", &CancellationToken::new())
        .await;

    assert_eq!(first.products.len(), 3);
    assert_eq!(second.products.len(), 3);
    assert!(site.fetch_counts().values().all(|&n| n == 2));
}
