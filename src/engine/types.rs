//! Engine types
//!
//! Run configuration and statistics for the list scraper.

use crate::types::ItemState;
use serde::{Deserialize, Serialize};

/// Configuration for a scrape run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// First page to fetch
    pub start_page: u32,
    /// Maximum number of pages to fetch (None = unlimited)
    pub max_pages: Option<u32>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            start_page: 1,
            max_pages: None,
        }
    }
}

impl ScrapeConfig {
    /// Create a new scrape config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the first page
    #[must_use]
    pub fn with_start_page(mut self, page: u32) -> Self {
        self.start_page = page;
        self
    }

    /// Cap the number of pages fetched
    #[must_use]
    pub fn with_max_pages(mut self, max: u32) -> Self {
        self.max_pages = Some(max);
        self
    }
}

/// Statistics from a scrape run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeStats {
    /// List pages fetched
    pub pages_fetched: usize,
    /// Items that ended `Ok`
    pub items_ok: usize,
    /// Items that ended `Skip`
    pub items_skipped: usize,
    /// Items that ended `Fail`
    pub items_failed: usize,
    /// Items that ended `MissingData`
    pub items_missing: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl ScrapeStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Count one finished item
    pub fn add_item(&mut self, state: ItemState) {
        match state {
            ItemState::Ok => self.items_ok += 1,
            ItemState::Skip => self.items_skipped += 1,
            ItemState::Fail => self.items_failed += 1,
            ItemState::MissingData => self.items_missing += 1,
        }
    }

    /// Total items that reached a terminal state
    pub fn items_total(&self) -> usize {
        self.items_ok + self.items_skipped + self.items_failed + self.items_missing
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
