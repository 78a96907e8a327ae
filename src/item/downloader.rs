//! Download task trait and the HTML/JSON downloaders

use crate::error::{Error, Result};
use crate::http::{RetryPolicy, Transport};
use crate::types::JsonValue;
use async_trait::async_trait;
use scraper::Html;
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// Traits
// ============================================================================

/// One item's fetch-and-assign cycle
#[async_trait]
pub trait ItemDownloadTask<T>: Send {
    /// Fetch the item and populate it
    async fn scrape(&mut self) -> Result<()>;

    /// Hand back the populated item
    fn into_item(self: Box<Self>) -> T;
}

/// Identifies the item being assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadContext<'a> {
    /// Item URL
    pub url: &'a str,
    /// Item ID
    pub id: &'a str,
}

/// An item populated from an HTML document
pub trait HtmlItem: Send + 'static {
    /// Extract fields from the parsed document
    fn assign_html(&mut self, document: &Html, ctx: &DownloadContext<'_>) -> Result<()>;
}

/// An item populated from a JSON payload
pub trait JsonItem: Send + 'static {
    /// Extract fields from the decoded payload (never `null`)
    fn assign_json(&mut self, data: JsonValue, ctx: &DownloadContext<'_>) -> Result<()>;
}

// ============================================================================
// HTML Downloader
// ============================================================================

/// Downloads an HTML page and assigns it to an [`HtmlItem`]
pub struct HtmlItemDownloader<T> {
    url: String,
    id: String,
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    item: T,
}

impl<T: HtmlItem> HtmlItemDownloader<T> {
    /// Create a downloader for a blank item
    pub fn new(
        url: impl Into<String>,
        id: impl Into<String>,
        transport: Arc<dyn Transport>,
        item: T,
    ) -> Self {
        Self {
            url: url.into(),
            id: id.into(),
            transport,
            retry: RetryPolicy::default(),
            item,
        }
    }

    /// Override the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Item URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Item ID
    pub fn id(&self) -> &str {
        &self.id
    }
}

// Html is not Send, so it must never live across an await point.
fn assign_html_body<T: HtmlItem>(item: &mut T, body: &str, ctx: &DownloadContext<'_>) -> Result<()> {
    let document = Html::parse_document(body);
    item.assign_html(&document, ctx)
}

#[async_trait]
impl<T: HtmlItem> ItemDownloadTask<T> for HtmlItemDownloader<T> {
    async fn scrape(&mut self) -> Result<()> {
        let response = self.retry.get(self.transport.as_ref(), &self.url).await?;
        debug!(id = %self.id, bytes = response.body.len(), "Fetched HTML item");

        let ctx = DownloadContext {
            url: &self.url,
            id: &self.id,
        };
        assign_html_body(&mut self.item, &response.body, &ctx)
    }

    fn into_item(self: Box<Self>) -> T {
        self.item
    }
}

// ============================================================================
// JSON Downloader
// ============================================================================

/// Downloads a JSON payload and assigns it to a [`JsonItem`].
///
/// A body that is not valid JSON, or that decodes to `null`, fails with
/// [`Error::BadPayload`] carrying the raw response.
pub struct JsonItemDownloader<T> {
    url: String,
    id: String,
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    item: T,
}

impl<T: JsonItem> JsonItemDownloader<T> {
    /// Create a downloader for a blank item
    pub fn new(
        url: impl Into<String>,
        id: impl Into<String>,
        transport: Arc<dyn Transport>,
        item: T,
    ) -> Self {
        Self {
            url: url.into(),
            id: id.into(),
            transport,
            retry: RetryPolicy::default(),
            item,
        }
    }

    /// Override the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Item URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Item ID
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Decode a JSON body, rejecting `null` and malformed payloads
pub(crate) fn decode_payload(url: &str, body: String) -> Result<JsonValue> {
    match serde_json::from_str::<JsonValue>(&body) {
        Ok(JsonValue::Null) | Err(_) => Err(Error::bad_payload(url, body)),
        Ok(data) => Ok(data),
    }
}

#[async_trait]
impl<T: JsonItem> ItemDownloadTask<T> for JsonItemDownloader<T> {
    async fn scrape(&mut self) -> Result<()> {
        let response = self.retry.get(self.transport.as_ref(), &self.url).await?;
        debug!(id = %self.id, bytes = response.body.len(), "Fetched JSON item");

        let data = decode_payload(&self.url, response.body)?;
        let ctx = DownloadContext {
            url: &self.url,
            id: &self.id,
        };
        self.item.assign_json(data, &ctx)
    }

    fn into_item(self: Box<Self>) -> T {
        self.item
    }
}

impl JsonItem for JsonValue {
    fn assign_json(&mut self, data: JsonValue, _ctx: &DownloadContext<'_>) -> Result<()> {
        *self = data;
        Ok(())
    }
}
