//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: YAML site → list pages → item downloads
//! → events and counters

use listscraper::log::NullSink;
use listscraper::{
    load_config_from_str, Breakable, DeclarativeSite, Error, HttpClient, ItemBeginEvent,
    ItemEndEvent, ItemMissingUrlEvent, ItemState, ListScraper, RetryPolicy,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

type Records = Arc<Mutex<Vec<(String, ItemState, Option<Value>)>>>;

fn scraper_for(yaml: &str) -> ListScraper<DeclarativeSite> {
    let config = load_config_from_str(yaml).unwrap();
    let source = DeclarativeSite::new(config.site.clone())
        .unwrap()
        .with_retry(RetryPolicy::none());
    let client = HttpClient::with_config(config.client_config().unwrap()).unwrap();

    ListScraper::new(source, Arc::new(client))
        .with_config(config.scrape.clone())
        .with_log_sink(Arc::new(NullSink))
}

fn record_items(scraper: &mut ListScraper<DeclarativeSite>) -> Records {
    let records: Records = Arc::default();
    let sink = Arc::clone(&records);
    scraper.on(move |event: &mut ItemEndEvent<Value>| {
        let item = event.take_item();
        sink.lock()
            .unwrap()
            .push((event.id().to_string(), event.state(), item));
        Ok(())
    });
    records
}

fn json_site(uri: &str) -> String {
    format!(
        r#"
name: shop
list_url: "{uri}/api/products?page={{{{ page }}}}"
items_path: data.products
item_url_template: "/api/products/{{{{ item.slug }}}}"
item_id: sku
total_items_path: meta.total
page_size_path: meta.per_page
"#
    )
}

async fn mount_list(server: &MockServer, page: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("page", page))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_item(server: &MockServer, slug: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/api/products/{slug}")))
        .respond_with(response)
        .mount(server)
        .await;
}

// ============================================================================
// JSON Sites
// ============================================================================

#[tokio::test]
async fn test_json_site_two_pages() {
    let server = MockServer::start().await;

    mount_list(
        &server,
        "1",
        json!({
            "meta": {"total": 3, "per_page": 2},
            "data": {"products": [{"sku": "A", "slug": "a"}, {"sku": "B", "slug": "b"}]}
        }),
    )
    .await;
    mount_list(
        &server,
        "2",
        json!({
            "meta": {"total": 3, "per_page": 2},
            "data": {"products": [{"sku": "C", "slug": "c"}]}
        }),
    )
    .await;
    mount_item(
        &server,
        "a",
        ResponseTemplate::new(200).set_body_json(json!({"name": "Kettle"})),
    )
    .await;
    mount_item(&server, "b", ResponseTemplate::new(500)).await;
    mount_item(
        &server,
        "c",
        ResponseTemplate::new(200).set_body_string("null"),
    )
    .await;

    let mut scraper = scraper_for(&json_site(&server.uri()));
    let records = record_items(&mut scraper);

    let count = scraper.scrape_from_start().await.unwrap();
    assert_eq!(count.total_items, Some(3));
    assert_eq!(count.items_in_page, Some(2));
    assert_eq!(count.current_page, Some(2));

    let records = records.lock().unwrap().clone();
    assert_eq!(
        records,
        vec![
            ("A".to_string(), ItemState::Ok, Some(json!({"name": "Kettle"}))),
            ("B".to_string(), ItemState::Fail, None),
            ("C".to_string(), ItemState::Fail, None),
        ]
    );

    let stats = scraper.stats();
    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.items_ok, 1);
    assert_eq!(stats.items_failed, 2);
}

#[tokio::test]
async fn test_empty_page_stops() {
    let server = MockServer::start().await;
    mount_list(&server, "1", json!({"data": {"products": []}})).await;

    let mut scraper = scraper_for(&json_site(&server.uri()));
    let records = record_items(&mut scraper);

    let count = scraper.scrape_from_start().await.unwrap();
    assert_eq!(count.current_page, Some(1));
    assert!(records.lock().unwrap().is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_break_from_item_begin() {
    let server = MockServer::start().await;
    mount_list(
        &server,
        "1",
        json!({"data": {"products": [
            {"sku": "A", "slug": "a"},
            {"sku": "B", "slug": "b"},
            {"sku": "C", "slug": "c"}
        ]}}),
    )
    .await;
    mount_item(&server, "a", ResponseTemplate::new(200).set_body_json(json!({"n": 1}))).await;

    let mut scraper = scraper_for(&json_site(&server.uri()));
    scraper.on(|event: &mut ItemBeginEvent<Value>| {
        if event.id() == "B" {
            event.break_list();
        }
        Ok(())
    });
    let records = record_items(&mut scraper);

    let count = scraper.scrape_from_start().await.unwrap();
    assert_eq!(count.current_page, Some(1));

    // break skips the item without an ItemEnd dispatch
    let ids: Vec<String> = records.lock().unwrap().iter().map(|r| r.0.clone()).collect();
    assert_eq!(ids, vec!["A".to_string()]);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_list_page_failure() {
    let server = MockServer::start().await;
    mount_list(
        &server,
        "1",
        json!({"data": {"products": [{"sku": "A", "slug": "a"}]}}),
    )
    .await;
    mount_item(&server, "a", ResponseTemplate::new(200).set_body_json(json!({}))).await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let mut scraper = scraper_for(&json_site(&server.uri()));
    let result = scraper.scrape_from_start().await;

    match result {
        Err(Error::PageFetch { url, source }) => {
            assert!(url.ends_with("/api/products?page=2"), "{url}");
            assert!(matches!(*source, Error::HttpStatus { status: 503, .. }));
        }
        other => panic!("expected page fetch error, got {other:?}"),
    }
    assert_eq!(scraper.item_count().current_page, Some(2));
    assert_eq!(scraper.stats().items_ok, 1);
}

#[tokio::test]
async fn test_missing_url_recovery() {
    let server = MockServer::start().await;
    mount_list(
        &server,
        "1",
        json!({"data": {"products": [{"sku": "A"}, {"sku": "B", "slug": "b"}]}}),
    )
    .await;
    mount_item(&server, "b", ResponseTemplate::new(200).set_body_json(json!({"n": 2}))).await;
    mount_item(&server, "a-fixed", ResponseTemplate::new(200).set_body_json(json!({"n": 1}))).await;

    let uri = server.uri();
    let mut scraper = scraper_for(&json_site(&uri));
    scraper.on(move |event: &mut ItemMissingUrlEvent<Value>| {
        if event.item_ref()["sku"] == "A" {
            event.set_url(format!("{uri}/api/products/a-fixed"));
        }
        Ok(())
    });
    let records = record_items(&mut scraper);

    scraper.scrape_from_start().await.unwrap();

    let records = records.lock().unwrap().clone();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], ("A".to_string(), ItemState::Ok, Some(json!({"n": 1}))));
    assert_eq!(records[1].1, ItemState::Ok);
}

#[tokio::test]
async fn test_max_pages_from_config() {
    let server = MockServer::start().await;
    for page in ["1", "2", "3"] {
        mount_list(
            &server,
            page,
            json!({"data": {"products": [{"sku": page, "slug": page}]}}),
        )
        .await;
    }
    for slug in ["1", "2", "3"] {
        mount_item(&server, slug, ResponseTemplate::new(200).set_body_json(json!({}))).await;
    }

    let yaml = format!(
        r#"
site:
{}
scrape:
  max_pages: 2
"#,
        json_site(&server.uri())
            .lines()
            .map(|line| format!("  {line}"))
            .collect::<Vec<_>>()
            .join("\n")
    );

    let mut scraper = scraper_for(&yaml);
    let count = scraper.scrape_from_start().await.unwrap();
    assert_eq!(count.current_page, Some(2));
    assert_eq!(scraper.stats().items_ok, 2);
}

// ============================================================================
// HTML Sites
// ============================================================================

#[tokio::test]
async fn test_html_site() {
    let server = MockServer::start().await;

    let list = r#"<html><body>
        <p class="count"><strong>2</strong> results</p>
        <ul>
          <li class="book"><a href="/books/dune.html" data-id="b1">Dune</a></li>
          <li class="book"><a href="/books/emma.html" data-id="b2">Emma</a></li>
        </ul>
    </body></html>"#;
    Mock::given(method("GET"))
        .and(path("/catalogue/page-1.html"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(list.as_bytes(), "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    for (slug, title) in [("dune", "Dune"), ("emma", "Emma")] {
        let body = format!(
            r#"<html><body><h1> {title} </h1><p class="price">£10.00</p></body></html>"#
        );
        Mock::given(method("GET"))
            .and(path(format!("/books/{slug}.html")))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/html"))
            .mount(&server)
            .await;
    }

    let yaml = format!(
        r#"
name: books
list_url: "{}/catalogue/page-{{{{ page }}}}.html"
format: html
items_path: li.book
item_fields:
  link: "a@href"
  id: "a@data-id"
item_url: link
item_id: id
total_items_path: "p.count strong"
has_more_path: "li.next a"
detail:
  type: html
  fields:
    title: h1
    price: p.price
"#,
        server.uri()
    );

    let mut scraper = scraper_for(&yaml);
    let records = record_items(&mut scraper);

    let count = scraper.scrape_from_start().await.unwrap();
    assert_eq!(count.total_items, Some(2));
    assert_eq!(count.current_page, Some(1));

    let records = records.lock().unwrap().clone();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].0, "b1");
    assert_eq!(
        records[0].2,
        Some(json!({
            "id": "b1",
            "url": format!("{}/books/dune.html", server.uri()),
            "title": "Dune",
            "price": "£10.00",
        }))
    );
    assert_eq!(records[1].0, "b2");
}
