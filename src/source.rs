//! Site collaborator trait
//!
//! [`ItemListSource`] is everything the scraper needs to know about one
//! site: how page URLs look, how to read a page, where the items are and
//! how to download each of them.

use crate::error::Result;
use crate::http::Transport;
use crate::item::ItemDownloadTask;
use std::sync::Arc;

/// Boxed download task for a source's item type
pub type BoxedDownloadTask<T> = Box<dyn ItemDownloadTask<T>>;

/// Site-specific URL construction and extraction
pub trait ItemListSource: Send + Sync {
    /// Parsed list page
    type Document;

    /// Handle to one item inside a list page
    type ItemRef: Send + 'static;

    /// Item produced by a successful download
    type Item: Send + 'static;

    /// URL of a list page. Must be a pure function of `page`.
    fn list_url(&self, page: u32) -> String;

    /// Parse a fetched list page
    fn parse_document(&self, url: &str, body: &str) -> Result<Self::Document>;

    /// Total number of items in the list, if the page reports it
    fn total_items(&self, document: &Self::Document) -> Option<u64>;

    /// Number of items per page, if the page reports it
    fn items_in_page(&self, document: &Self::Document) -> Option<u64>;

    /// Item references on a page, in document order
    fn items(&self, document: &Self::Document) -> Vec<Self::ItemRef>;

    /// URL of an item. `None` triggers missing-URL recovery.
    fn item_url(&self, item_ref: &Self::ItemRef) -> Option<String>;

    /// Stable ID of an item
    fn item_id(&self, url: &str, item_ref: &Self::ItemRef) -> String;

    /// Build the download task for an item. `Ok(None)` skips the item.
    fn item_downloader(
        &self,
        url: &str,
        id: &str,
        transport: &Arc<dyn Transport>,
    ) -> Result<Option<BoxedDownloadTask<Self::Item>>>;

    /// Whether another page follows `page`.
    ///
    /// Called once per fetched page right after [`items`](Self::items),
    /// before any item of the page is downloaded, because the document is
    /// released before the first await. The answer is ignored when the page
    /// turns out empty or a handler breaks the list.
    fn has_next_page(&self, _document: &Self::Document, _page: u32) -> bool {
        true
    }
}
