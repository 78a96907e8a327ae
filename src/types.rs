//! Common types used throughout listscraper
//!
//! This module contains the outcome classification of a scraped item
//! and the progress counters shared between pages.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Item State
// ============================================================================

/// Terminal classification of one item's processing.
///
/// Every item reference yields exactly one state, which is logged once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    /// The item was downloaded and assigned
    Ok,
    /// The item was skipped by a handler or by the source
    Skip,
    /// Downloading or handling the item failed
    Fail,
    /// The item had no URL and none was recovered
    MissingData,
}

impl ItemState {
    /// Numeric code of the state
    pub fn code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Skip => 1,
            Self::Fail => 2,
            Self::MissingData => 3,
        }
    }

    /// Single character used in progress output
    pub fn glyph(self) -> char {
        match self {
            Self::Ok => '.',
            Self::Skip => 's',
            Self::Fail => 'f',
            Self::MissingData => 'x',
        }
    }

    /// Check if the item was produced
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ok => "ok",
            Self::Skip => "skip",
            Self::Fail => "fail",
            Self::MissingData => "missing_data",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Item Count
// ============================================================================

/// Progress counters for one scrape run.
///
/// Every field stays `None` until the source reports it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCount {
    /// Total number of items across all pages
    pub total_items: Option<u64>,
    /// Number of items in a single page
    pub items_in_page: Option<u64>,
    /// Page currently being scraped
    pub current_page: Option<u32>,
}

impl ItemCount {
    /// Create empty counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total number of items
    pub fn set_total_items(&mut self, total: Option<u64>) {
        self.total_items = total;
    }

    /// Set the number of items in a page
    pub fn set_items_in_page(&mut self, size: Option<u64>) {
        self.items_in_page = size;
    }

    /// Set the current page number
    pub fn set_current_page(&mut self, page: Option<u32>) {
        self.current_page = page;
    }

    /// Number of items covered up to the current page, capped by the total.
    ///
    /// Returns `None` unless the page size and a non-zero total are known.
    pub fn progress(&self) -> Option<(u64, u64)> {
        let total = self.total_items.filter(|t| *t > 0)?;
        let size = self.items_in_page?;
        let page = u64::from(self.current_page.unwrap_or(0));
        Some((page.saturating_mul(size).min(total), total))
    }
}
