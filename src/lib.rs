// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # listscraper
//!
//! Paginated list scraping: walk a listing page by page, download every
//! item on it and let observers steer the run.
//!
//! ## Features
//!
//! - **Page/item state machine**: one item in flight, item failures never
//!   stop the list
//! - **Lifecycle events**: skip an item or break the list from a handler
//! - **HTML and JSON items**: `scraper` documents or decoded JSON payloads
//! - **Retries**: connectivity failures are retried with a fixed delay
//! - **Declarative sites**: describe a listing in YAML and run it from the CLI
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use listscraper::{load_config, DeclarativeSite, HttpClient, ItemEndEvent, ListScraper};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> listscraper::Result<()> {
//!     let config = load_config("sites/shop.yaml")?;
//!     let source = DeclarativeSite::new(config.site.clone())?;
//!     let client = HttpClient::with_config(config.client_config()?)?;
//!
//!     let mut scraper = ListScraper::new(source, Arc::new(client));
//!     scraper.on(|event: &mut ItemEndEvent<serde_json::Value>| {
//!         if let Some(item) = event.take_item() {
//!             println!("{item}");
//!         }
//!         Ok(())
//!     });
//!
//!     let count = scraper.scrape_from_start().await?;
//!     println!("{count:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                      ListScraper                          │
//! │  ListBegin → fetch → items → ItemBegin/ItemEnd → ListEnd  │
//! └───────────────────────────────────────────────────────────┘
//!          │                │                 │
//! ┌────────┴──────┬─────────┴───────┬─────────┴───────┐
//! │ ItemListSource│  ItemDownload   │   EventBus /    │
//! │ (site, YAML)  │  Task (HTML,JSON)│   LogSink      │
//! ├───────────────┴─────────────────┴─────────────────┤
//! │          Transport (reqwest, retry, rate limit)   │
//! └───────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Lifecycle events and flow control
pub mod events;

/// Milestone log sinks
pub mod log;

/// HTTP transport with retry and rate limiting
pub mod http;

/// Item download tasks
pub mod item;

/// Site collaborator trait
pub mod source;

/// List scraping engine
pub mod engine;

/// Declarative sites
pub mod site;

/// Scraper configuration
pub mod config;

/// YAML loader for scraper configurations
pub mod loader;

/// Template interpolation
pub mod template;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::ScraperConfig;
pub use engine::{ListScraper, ScrapeConfig, ScrapeStats};
pub use events::{
    BreakListEvent, Breakable, EventBus, FlowControl, ItemBeginEvent, ItemEndEvent,
    ItemMissingUrlEvent, ListBeginEvent, ListEndEvent,
};
pub use http::{HttpClient, HttpClientConfig, RetryPolicy, Transport};
pub use item::{HtmlItem, HtmlItemDownloader, ItemDownloadTask, JsonItem, JsonItemDownloader};
pub use loader::{load_config, load_config_from_str};
pub use log::{LogRecord, LogSink};
pub use site::{DeclarativeSite, SiteDefinition};
pub use source::ItemListSource;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
