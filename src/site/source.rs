//! Declarative item list source
//!
//! [`DeclarativeSite`] implements [`ItemListSource`] on top of a
//! [`SiteDefinition`], so a site can be scraped from a YAML file alone.

use super::definition::{DetailSpec, PageFormat, SiteDefinition};
use super::extract::{self, FieldSelector};
use crate::error::{Error, Result};
use crate::http::{RetryPolicy, Transport};
use crate::item::{
    DownloadContext, HtmlItem, HtmlItemDownloader, ItemDownloadTask, JsonItemDownloader,
};
use crate::source::{BoxedDownloadTask, ItemListSource};
use crate::template;
use crate::types::{JsonObject, JsonValue};
use async_trait::async_trait;
use scraper::Html;
use std::sync::Arc;
use tracing::warn;
use url::Url;

/// A fetched list page
pub enum SiteDocument {
    /// Decoded JSON page
    Json(JsonValue),
    /// Parsed HTML page
    Html(Html),
}

/// Item list source driven by a [`SiteDefinition`]
#[derive(Debug, Clone)]
pub struct DeclarativeSite {
    definition: SiteDefinition,
    retry: RetryPolicy,
    base: Url,
}

impl DeclarativeSite {
    /// Create a source from a definition.
    ///
    /// Fails when the definition is invalid or a selector does not parse.
    pub fn new(definition: SiteDefinition) -> Result<Self> {
        definition.validate()?;

        let base = match &definition.base_url {
            Some(base) => Url::parse(base)?,
            None => Url::parse(&definition.render_list_url(1)?)?,
        };

        if definition.format == PageFormat::Html {
            extract::validate_selector("site.items_path", &definition.items_path)?;
            for (name, pattern) in &definition.item_fields {
                FieldSelector::new(pattern).validate(name)?;
            }
            let paths = [
                ("site.total_items_path", &definition.total_items_path),
                ("site.page_size_path", &definition.page_size_path),
                ("site.has_more_path", &definition.has_more_path),
            ];
            for (field, path) in paths {
                if let Some(path) = path {
                    FieldSelector::new(path).validate(field)?;
                }
            }
        }
        if let DetailSpec::Html { fields } = &definition.detail {
            for (name, pattern) in fields {
                FieldSelector::new(pattern).validate(name)?;
            }
        }

        Ok(Self {
            definition,
            retry: RetryPolicy::default(),
            base,
        })
    }

    /// Set the retry policy used by item downloads
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Site name
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Get the definition
    pub fn definition(&self) -> &SiteDefinition {
        &self.definition
    }

    /// Base for relative item URLs
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Retry policy for item downloads
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Read a count from the page
    fn count(&self, document: &SiteDocument, field: &str, path: Option<&str>) -> Option<u64> {
        let path = path?;
        match document {
            SiteDocument::Json(value) => {
                extract::extract_simple_path(value, path).and_then(|v| extract::value_as_count(&v))
            }
            SiteDocument::Html(html) => FieldSelector::new(path)
                .extract_from_document(field, html)
                .ok()
                .and_then(|v| extract::value_as_count(&v)),
        }
    }

    fn raw_item_url(&self, item: &JsonValue) -> Option<String> {
        if let Some(field) = &self.definition.item_url {
            return extract::extract_simple_path(item, field)
                .and_then(|v| extract::value_as_key(&v));
        }

        let template = self.definition.item_url_template.as_deref()?;
        let mut ctx = self.definition.template_context();
        ctx.set_item(item.clone());
        match template::render(template, &ctx) {
            Ok(url) if !url.is_empty() => Some(url),
            Ok(_) => None,
            Err(e) => {
                warn!(site = %self.definition.name, "Cannot build item URL: {}", e);
                None
            }
        }
    }
}

impl ItemListSource for DeclarativeSite {
    type Document = SiteDocument;
    type ItemRef = JsonValue;
    type Item = JsonValue;

    fn list_url(&self, page: u32) -> String {
        // validation guarantees every list URL variable is known
        self.definition.render_list_url(page).unwrap_or_else(|e| {
            warn!(site = %self.definition.name, page, "Cannot render list URL: {}", e);
            self.definition.list_url.clone()
        })
    }

    fn parse_document(&self, url: &str, body: &str) -> Result<SiteDocument> {
        match self.definition.format {
            PageFormat::Json => serde_json::from_str(body)
                .map(SiteDocument::Json)
                .map_err(|e| Error::decode(format!("list page {url} is not JSON: {e}"))),
            PageFormat::Html => Ok(SiteDocument::Html(Html::parse_document(body))),
        }
    }

    fn total_items(&self, document: &SiteDocument) -> Option<u64> {
        self.count(
            document,
            "total_items_path",
            self.definition.total_items_path.as_deref(),
        )
    }

    fn items_in_page(&self, document: &SiteDocument) -> Option<u64> {
        self.count(
            document,
            "page_size_path",
            self.definition.page_size_path.as_deref(),
        )
    }

    fn items(&self, document: &SiteDocument) -> Vec<JsonValue> {
        let items = match document {
            SiteDocument::Json(value) => extract::extract_all(value, &self.definition.items_path),
            SiteDocument::Html(html) => html_items(html, &self.definition),
        };

        items.unwrap_or_else(|e| {
            warn!(site = %self.definition.name, "Cannot read items: {}", e);
            Vec::new()
        })
    }

    fn item_url(&self, item: &JsonValue) -> Option<String> {
        let raw = self.raw_item_url(item)?;
        match self.base.join(&raw) {
            Ok(url) => Some(url.into()),
            Err(e) => {
                warn!(site = %self.definition.name, url = %raw, "Invalid item URL: {}", e);
                None
            }
        }
    }

    fn item_id(&self, url: &str, item: &JsonValue) -> String {
        self.definition
            .item_id
            .as_deref()
            .and_then(|field| extract::extract_simple_path(item, field))
            .and_then(|v| extract::value_as_key(&v))
            .unwrap_or_else(|| last_path_segment(url))
    }

    fn item_downloader(
        &self,
        url: &str,
        id: &str,
        transport: &Arc<dyn Transport>,
    ) -> Result<Option<BoxedDownloadTask<JsonValue>>> {
        let task: BoxedDownloadTask<JsonValue> = match &self.definition.detail {
            DetailSpec::Json => Box::new(
                JsonItemDownloader::new(url, id, Arc::clone(transport), JsonValue::Null)
                    .with_retry(self.retry.clone()),
            ),
            DetailSpec::Html { fields } => {
                let record = HtmlRecord::new(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())));
                Box::new(HtmlRecordTask(
                    HtmlItemDownloader::new(url, id, Arc::clone(transport), record)
                        .with_retry(self.retry.clone()),
                ))
            }
        };
        Ok(Some(task))
    }

    /// Uses `has_more_path` when set, otherwise compares the page against
    /// the reported total. Keeps going when neither is known.
    fn has_next_page(&self, document: &SiteDocument, page: u32) -> bool {
        if let Some(path) = &self.definition.has_more_path {
            return match document {
                SiteDocument::Json(value) => match extract::extract_simple_path(value, path) {
                    Some(JsonValue::Bool(more)) => more,
                    Some(JsonValue::Null) | None => false,
                    Some(_) => true,
                },
                SiteDocument::Html(html) => FieldSelector::new(path)
                    .matches("has_more_path", html)
                    .unwrap_or(false),
            };
        }

        match (self.total_items(document), self.items_in_page(document)) {
            (Some(total), Some(size)) if size > 0 => u64::from(page)
                .checked_mul(size)
                .is_some_and(|covered| covered < total),
            _ => true,
        }
    }
}

fn html_items(document: &Html, definition: &SiteDefinition) -> Result<Vec<JsonValue>> {
    let fields: Vec<(&str, FieldSelector)> = definition
        .item_fields
        .iter()
        .map(|(name, pattern)| (name.as_str(), FieldSelector::new(pattern)))
        .collect();

    extract::select_elements(document, &definition.items_path)?
        .into_iter()
        .map(|element| {
            let mut record = JsonObject::new();
            for (name, selector) in &fields {
                record.insert((*name).to_string(), selector.extract_from_element(name, element)?);
            }
            Ok(JsonValue::Object(record))
        })
        .collect()
}

fn last_path_segment(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string))
        })
        .unwrap_or_else(|| url.to_string())
}

// ============================================================================
// HTML detail pages
// ============================================================================

/// JSON record filled from an HTML item page
#[derive(Debug, Clone, Default)]
pub struct HtmlRecord {
    fields: Vec<(String, FieldSelector)>,
    record: JsonObject,
}

impl HtmlRecord {
    /// Create a record extracting `(name, selector)` fields
    pub fn new<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            fields: fields
                .into_iter()
                .map(|(name, pattern)| (name.to_string(), FieldSelector::new(pattern)))
                .collect(),
            record: JsonObject::new(),
        }
    }

    /// The extracted record
    pub fn into_value(self) -> JsonValue {
        JsonValue::Object(self.record)
    }
}

impl HtmlItem for HtmlRecord {
    fn assign_html(&mut self, document: &Html, ctx: &DownloadContext<'_>) -> Result<()> {
        self.record.insert("id".into(), ctx.id.into());
        self.record.insert("url".into(), ctx.url.into());
        for (name, selector) in &self.fields {
            let value = selector.extract_from_document(name, document)?;
            self.record.insert(name.clone(), value);
        }
        Ok(())
    }
}

/// Adapts the HTML downloader to produce JSON items
struct HtmlRecordTask(HtmlItemDownloader<HtmlRecord>);

#[async_trait]
impl ItemDownloadTask<JsonValue> for HtmlRecordTask {
    async fn scrape(&mut self) -> Result<()> {
        self.0.scrape().await
    }

    fn into_item(self: Box<Self>) -> JsonValue {
        Box::new(self.0).into_item().into_value()
    }
}
