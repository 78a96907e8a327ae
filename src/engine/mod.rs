//! List scraping engine
//!
//! Walks a paginated listing page by page and processes every item on it.
//!
//! # Overview
//!
//! The engine module provides:
//! - `ListScraper` - The page/item state machine
//! - `ScrapeConfig` - Configuration for a scrape run
//! - `ScrapeStats` - Counters collected during a run
//!
//! # Flow
//!
//! ```text
//! ListBegin ─► fetch page ─► page meta ─► for each item ─► ListEnd ─► next page
//!                                           │
//!                                           ├─ resolve URL (ItemMissingUrl)
//!                                           ├─ ItemBegin (skip / break)
//!                                           ├─ download task
//!                                           └─ ItemEnd
//! ```
//!
//! Handlers steer the loop through the [`FlowControl`](crate::events::FlowControl)
//! carried by `ListBegin`, `ListEnd` and `ItemBegin` events. An item failing
//! never stops the list; a list page that cannot be fetched does.

mod types;

pub use types::{ScrapeConfig, ScrapeStats};

use crate::error::{Error, Result};
use crate::events::{
    Breakable, BreakListEvent, Event, EventBus, ItemBeginEvent, ItemEndEvent,
    ItemMissingUrlEvent, ListBeginEvent, ListEndEvent,
};
use crate::http::Transport;
use crate::log::{LogRecord, LogSink, TracingSink};
use crate::source::ItemListSource;
use crate::types::{ItemCount, ItemState};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Paginated list scraper
pub struct ListScraper<S: ItemListSource> {
    /// Site collaborator
    source: S,
    /// Transport for list pages; handed to item downloaders
    transport: Arc<dyn Transport>,
    /// Lifecycle event handlers
    events: EventBus,
    /// Milestone sink
    log: Arc<dyn LogSink<S::Item>>,
    /// Run configuration
    config: ScrapeConfig,
    /// Counters of the current (or last) run
    item_count: ItemCount,
    /// Statistics of the current (or last) run
    stats: ScrapeStats,
}

impl<S: ItemListSource> ListScraper<S> {
    /// Create a new scraper logging through `tracing`
    pub fn new(source: S, transport: Arc<dyn Transport>) -> Self {
        Self {
            source,
            transport,
            events: EventBus::new(),
            log: Arc::new(TracingSink::new()),
            config: ScrapeConfig::default(),
            item_count: ItemCount::new(),
            stats: ScrapeStats::default(),
        }
    }

    /// Set the log sink
    #[must_use]
    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink<S::Item>>) -> Self {
        self.log = sink;
        self
    }

    /// Replace the event bus
    #[must_use]
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// Set scrape configuration
    #[must_use]
    pub fn with_config(mut self, config: ScrapeConfig) -> Self {
        self.config = config;
        self
    }

    /// Register an event handler.
    ///
    /// Item events are generic, so a handler typed for another item type
    /// is stored but never called. Prefer the typed `on_*` methods below.
    pub fn on<E, F>(&mut self, handler: F) -> &mut Self
    where
        E: Event,
        F: Fn(&mut E) -> Result<()> + Send + Sync + 'static,
    {
        self.events.on(handler);
        self
    }

    /// Register a `ListBeginEvent` handler
    pub fn on_list_begin<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut ListBeginEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.on(handler)
    }

    /// Register a `ListEndEvent` handler
    pub fn on_list_end<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut ListEndEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.on(handler)
    }

    /// Register an `ItemBeginEvent` handler for this source's item references
    pub fn on_item_begin<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut ItemBeginEvent<S::ItemRef>) -> Result<()> + Send + Sync + 'static,
    {
        self.on(handler)
    }

    /// Register an `ItemMissingUrlEvent` handler
    pub fn on_item_missing_url<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut ItemMissingUrlEvent<S::ItemRef>) -> Result<()> + Send + Sync + 'static,
    {
        self.on(handler)
    }

    /// Register an `ItemEndEvent` handler for this source's items
    pub fn on_item_end<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut ItemEndEvent<S::Item>) -> Result<()> + Send + Sync + 'static,
    {
        self.on(handler)
    }

    /// Register a `BreakListEvent` handler
    pub fn on_break_list<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut BreakListEvent<S::ItemRef>) -> Result<()> + Send + Sync + 'static,
    {
        self.on(handler)
    }

    /// Get the event bus
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Get mutable event bus
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Get the site collaborator
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get the transport
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Get the scrape configuration
    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Counters of the current or last run.
    ///
    /// After a failed run, `current_page` is the page that could not be
    /// fetched.
    pub fn item_count(&self) -> &ItemCount {
        &self.item_count
    }

    /// Get statistics
    pub fn stats(&self) -> &ScrapeStats {
        &self.stats
    }

    /// Scrape from the configured start page
    pub async fn scrape_from_start(&mut self) -> Result<ItemCount> {
        self.scrape(self.config.start_page).await
    }

    /// Scrape the list starting at `start_page`.
    ///
    /// Returns the counters once pagination ends. Fails only when a list
    /// page cannot be fetched or a handler of an event other than
    /// `ItemEndEvent` fails; item errors are absorbed into item states.
    pub async fn scrape(&mut self, start_page: u32) -> Result<ItemCount> {
        let start = Instant::now();
        self.item_count = ItemCount::new();
        self.stats = ScrapeStats::new();

        let result = self.run(start_page).await;

        self.stats.set_duration(start.elapsed().as_millis() as u64);
        result.map(|()| self.item_count)
    }

    async fn run(&mut self, start_page: u32) -> Result<()> {
        let mut page_num = start_page;
        let mut pages_fetched: u32 = 0;

        loop {
            let mut will_continue = true;

            let event = self.events.trigger(ListBeginEvent::new(page_num))?;
            if event.should_break() {
                debug!(page = page_num, "List stopped before page");
                break;
            } else if !event.should_skip() {
                self.log.emit(LogRecord::ListBegin { page_num });

                self.item_count.set_current_page(Some(page_num));
                will_continue = self.download_page(page_num).await?;

                pages_fetched += 1;
                if self.config.max_pages.is_some_and(|max| pages_fetched >= max) {
                    debug!(pages = pages_fetched, "Page limit reached");
                    will_continue = false;
                }

                let event = self
                    .events
                    .trigger(ListEndEvent::new(self.item_count, will_continue))?;
                if event.should_break() {
                    will_continue = false;
                }

                self.log.emit(LogRecord::ListEnd {
                    item_count: &self.item_count,
                    will_continue,
                });
            }

            if !will_continue {
                break;
            }
            page_num += 1;
        }

        Ok(())
    }

    /// Fetch one list page and process its items.
    ///
    /// Returns whether another page should be fetched.
    async fn download_page(&mut self, page_num: u32) -> Result<bool> {
        let url = self.source.list_url(page_num);

        let response = match self.transport.get(&url).await {
            Ok(response) => response,
            Err(e) => return Err(self.page_failed(url, e)),
        };
        self.stats.add_page();

        let (items, has_next_page) = match self.read_page(&url, &response.body, page_num) {
            Ok(page) => page,
            Err(e) => return Err(self.page_failed(url, e)),
        };
        debug!(page = page_num, items = items.len(), "Fetched list page");

        let mut will_continue = false;
        for item_ref in items {
            will_continue = true;
            if !self.process_item(item_ref).await? {
                will_continue = false;
                break;
            }
        }

        Ok(will_continue && has_next_page)
    }

    /// Parse a page and record its metadata.
    ///
    /// Kept synchronous so the parsed document never lives across an await.
    fn read_page(
        &mut self,
        url: &str,
        body: &str,
        page_num: u32,
    ) -> Result<(Vec<S::ItemRef>, bool)> {
        let document = self.source.parse_document(url, body)?;

        self.item_count
            .set_total_items(self.source.total_items(&document));
        self.item_count
            .set_items_in_page(self.source.items_in_page(&document));

        let items = self.source.items(&document);
        let has_next_page = self.source.has_next_page(&document, page_num);
        Ok((items, has_next_page))
    }

    fn page_failed(&self, url: String, error: Error) -> Error {
        self.log.emit(LogRecord::Exception {
            error: &error,
            url: Some(&url),
        });
        Error::page_fetch(url, error)
    }

    /// Process one item reference.
    ///
    /// Returns `false` when a handler broke the list.
    async fn process_item(&mut self, item_ref: S::ItemRef) -> Result<bool> {
        let (item_ref, url) = match self.source.item_url(&item_ref) {
            Some(url) => (item_ref, url),
            None => {
                let event = self.events.trigger(ItemMissingUrlEvent::new(item_ref))?;
                match event.into_parts() {
                    (item_ref, Some(url)) => (item_ref, url),
                    (_, None) => {
                        self.log.emit(LogRecord::ItemBegin {
                            id: None,
                            url: None,
                        });
                        self.end_item(None, ItemState::MissingData);
                        return Ok(true);
                    }
                }
            }
        };

        let id = self.source.item_id(&url, &item_ref);
        self.log.emit(LogRecord::ItemBegin {
            id: Some(&id),
            url: Some(&url),
        });

        let event = self
            .events
            .trigger(ItemBeginEvent::new(id.as_str(), url.as_str(), item_ref))?;
        if event.should_skip() {
            self.end_item(None, ItemState::Skip);
            return Ok(true);
        } else if event.should_break() {
            self.events.trigger(BreakListEvent::new(Some(event)))?;
            self.end_item(None, ItemState::Skip);
            self.log.emit(LogRecord::BreakList);
            return Ok(false);
        }

        let (item, state) = self.download_item(&url, &id).await;

        let event = ItemEndEvent::new(item, self.item_count, state, id.as_str(), url.as_str());
        let event = match self.events.trigger(event) {
            Ok(event) => event,
            Err(e) => {
                self.log.emit(LogRecord::Exception {
                    error: &e,
                    url: Some(&url),
                });

                let retry = ItemEndEvent::new(
                    None,
                    self.item_count,
                    ItemState::Fail,
                    id.as_str(),
                    url.as_str(),
                );
                match self.events.trigger(retry) {
                    Ok(event) => event,
                    Err(e) => {
                        self.log.emit(LogRecord::Exception {
                            error: &e,
                            url: Some(&url),
                        });
                        ItemEndEvent::new(None, self.item_count, ItemState::Fail, id, url)
                    }
                }
            }
        };

        self.end_item(event.item(), event.state());
        Ok(true)
    }

    /// Run the item's download task, absorbing every error into the state
    async fn download_item(&self, url: &str, id: &str) -> (Option<S::Item>, ItemState) {
        let mut task = match self.source.item_downloader(url, id, &self.transport) {
            Ok(Some(task)) => task,
            Ok(None) => return (None, ItemState::Skip),
            Err(e) => {
                self.log.emit(LogRecord::Exception {
                    error: &e,
                    url: Some(url),
                });
                return (None, ItemState::Fail);
            }
        };

        match task.scrape().await {
            Ok(()) => (Some(task.into_item()), ItemState::Ok),
            Err(e) => {
                self.log.emit(LogRecord::Exception {
                    error: &e,
                    url: Some(url),
                });
                (None, ItemState::Fail)
            }
        }
    }

    fn end_item(&mut self, item: Option<&S::Item>, state: ItemState) {
        self.stats.add_item(state);
        self.log.emit(LogRecord::ItemEnd { item, state });
    }
}

impl<S: ItemListSource + std::fmt::Debug> std::fmt::Debug for ListScraper<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListScraper")
            .field("source", &self.source)
            .field("events", &self.events)
            .field("config", &self.config)
            .field("item_count", &self.item_count)
            .finish_non_exhaustive()
    }
}
