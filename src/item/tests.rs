//! Tests for item download tasks

use super::*;
use crate::error::Error;
use crate::http::{FetchResponse, HttpClient, HttpClientConfig, RetryPolicy, Transport};
use crate::types::JsonValue;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use scraper::{Html, Selector};
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves a fixed body after refusing `failures` connections
struct StaticTransport {
    body: String,
    failures: u32,
    calls: AtomicU32,
}

impl StaticTransport {
    fn new(body: &str) -> Arc<Self> {
        Self::flaky(body, 0)
    }

    fn flaky(body: &str, failures: u32) -> Arc<Self> {
        Arc::new(Self {
            body: body.to_string(),
            failures,
            calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl Transport for StaticTransport {
    async fn get(&self, url: &str) -> crate::Result<FetchResponse> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
            return Err(Error::connect(url, "connection reset"));
        }
        Ok(FetchResponse::ok(url, self.body.clone()))
    }
}

#[derive(Debug, Default, PartialEq)]
struct Product {
    id: String,
    title: String,
    price: Option<f64>,
}

impl HtmlItem for Product {
    fn assign_html(&mut self, document: &Html, ctx: &DownloadContext<'_>) -> crate::Result<()> {
        let title = Selector::parse("h1.title").map_err(|e| Error::extract("title", e.to_string()))?;
        let price = Selector::parse("span.price").map_err(|e| Error::extract("price", e.to_string()))?;

        self.id = ctx.id.to_string();
        self.title = document
            .select(&title)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .ok_or_else(|| Error::extract("title", "missing"))?;
        self.price = document
            .select(&price)
            .next()
            .and_then(|el| el.text().collect::<String>().trim().parse().ok());
        Ok(())
    }
}

impl JsonItem for Product {
    fn assign_json(&mut self, data: JsonValue, ctx: &DownloadContext<'_>) -> crate::Result<()> {
        self.id = ctx.id.to_string();
        self.title = data["name"]
            .as_str()
            .ok_or_else(|| Error::extract("name", "not a string"))?
            .to_string();
        self.price = data["price"].as_f64();
        Ok(())
    }
}

const PRODUCT_HTML: &str = r#"
<html><body>
  <h1 class="title"> Blue Kettle </h1>
  <span class="price">24.5</span>
</body></html>
"#;

// ============================================================================
// HtmlItemDownloader Tests
// ============================================================================

#[tokio::test]
async fn test_html_downloader_assigns_item() {
    let transport = StaticTransport::new(PRODUCT_HTML);
    let mut task =
        HtmlItemDownloader::new("https://shop/p/7", "7", transport, Product::default());

    assert_eq!(task.url(), "https://shop/p/7");
    assert_eq!(task.id(), "7");

    task.scrape().await.unwrap();
    let item = Box::new(task).into_item();

    assert_eq!(
        item,
        Product {
            id: "7".to_string(),
            title: "Blue Kettle".to_string(),
            price: Some(24.5),
        }
    );
}

#[tokio::test]
async fn test_html_downloader_propagates_assign_error() {
    let transport = StaticTransport::new("<html><body>nothing</body></html>");
    let mut task = HtmlItemDownloader::new("https://shop/p/8", "8", transport, Product::default());

    let err = task.scrape().await.unwrap_err();
    assert!(matches!(err, Error::Extract { ref field, .. } if field == "title"));
}

#[tokio::test(start_paused = true)]
async fn test_html_downloader_retries_connectivity() {
    let transport = StaticTransport::flaky(PRODUCT_HTML, 2);
    let mut task = HtmlItemDownloader::new(
        "https://shop/p/7",
        "7",
        transport.clone(),
        Product::default(),
    )
    .with_retry(RetryPolicy::new(2, Duration::from_secs(1)));

    task.scrape().await.unwrap();
    assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_html_downloader_gives_up_after_retries() {
    let transport = StaticTransport::flaky(PRODUCT_HTML, 5);
    let mut task = HtmlItemDownloader::new(
        "https://shop/p/7",
        "7",
        transport.clone(),
        Product::default(),
    )
    .with_retry(RetryPolicy::new(1, Duration::from_secs(1)));

    let err = task.scrape().await.unwrap_err();
    assert!(err.is_connectivity());
    assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
}

// ============================================================================
// JsonItemDownloader Tests
// ============================================================================

#[tokio::test]
async fn test_json_downloader_assigns_item() {
    let transport = StaticTransport::new(r#"{"name": "Teapot", "price": 12}"#);
    let mut task = JsonItemDownloader::new("https://api/p/3", "3", transport, Product::default());

    task.scrape().await.unwrap();
    let item = Box::new(task).into_item();

    assert_eq!(item.id, "3");
    assert_eq!(item.title, "Teapot");
    assert_eq!(item.price, Some(12.0));
}

#[tokio::test]
async fn test_json_downloader_null_payload_is_bad_payload() {
    let transport = StaticTransport::new("null");
    let mut task = JsonItemDownloader::new("https://api/p/3", "3", transport, Product::default());

    match task.scrape().await.unwrap_err() {
        Error::BadPayload { url, body } => {
            assert_eq!(url, "https://api/p/3");
            assert_eq!(body, "null");
        }
        other => panic!("Expected bad payload, got {other:?}"),
    }
}

#[tokio::test]
async fn test_json_downloader_malformed_payload_keeps_raw_body() {
    let transport = StaticTransport::new("<html>maintenance</html>");
    let mut task = JsonItemDownloader::new("https://api/p/3", "3", transport.clone(), json!({}))
        .with_retry(RetryPolicy::none());

    let err = task.scrape().await.unwrap_err();

    assert_eq!(err.response_body(), Some("<html>maintenance</html>"));
    // Decoding failures are never retried
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_json_downloader_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items/42.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42, "tags": ["a"]})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .build();
    let transport: Arc<dyn Transport> = Arc::new(HttpClient::with_config(config).unwrap());

    let mut task = JsonItemDownloader::new("/items/42.json", "42", transport, JsonValue::Null);
    task.scrape().await.unwrap();

    assert_eq!(Box::new(task).into_item(), json!({"id": 42, "tags": ["a"]}));
}

#[tokio::test]
async fn test_json_downloader_http_error_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items/1.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .build();
    let transport: Arc<dyn Transport> = Arc::new(HttpClient::with_config(config).unwrap());

    let mut task = JsonItemDownloader::new("/items/1.json", "1", transport, JsonValue::Null);
    let err = task.scrape().await.unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
}
