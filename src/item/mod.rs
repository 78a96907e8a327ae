//! Item download tasks
//!
//! An [`ItemDownloadTask`] performs one fetch-and-assign cycle for a single
//! item and then hands the populated item back to the scraper.
//!
//! # Flavours
//!
//! - [`HtmlItemDownloader`]: parses the response as HTML and calls
//!   [`HtmlItem::assign_html`]
//! - [`JsonItemDownloader`]: decodes the response as JSON and calls
//!   [`JsonItem::assign_json`]
//!
//! Both fetch through a [`RetryPolicy`](crate::http::RetryPolicy), so
//! transient connectivity failures are retried before the item fails.

mod downloader;

pub use downloader::{
    DownloadContext, HtmlItem, HtmlItemDownloader, ItemDownloadTask, JsonItem,
    JsonItemDownloader,
};

#[cfg(test)]
mod tests;
