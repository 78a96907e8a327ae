//! Transport abstraction
//!
//! The scraper and item downloaders fetch documents only through this trait.

use crate::error::Result;
use async_trait::async_trait;

/// A fetched document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// Final URL of the response
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
}

impl FetchResponse {
    /// Create a new response
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a 200 response
    pub fn ok(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(url, 200, body)
    }
}

/// Fetches documents by URL.
///
/// Implementations report connection-level failures as errors for which
/// [`Error::is_connectivity`](crate::Error::is_connectivity) returns true,
/// and error statuses as [`Error::HttpStatus`](crate::Error::HttpStatus).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET request
    async fn get(&self, url: &str) -> Result<FetchResponse>;
}
