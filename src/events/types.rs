//! Event types and flow control
//!
//! Defines the signal handlers use to steer the scraper, and one event type
//! per lifecycle milestone.

use crate::types::{ItemCount, ItemState};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

// ============================================================================
// Event Names
// ============================================================================

/// Name under which an event type is published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    /// Before a list page is fetched
    ListBegin,
    /// After a list page has been processed
    ListEnd,
    /// Before an item is downloaded
    ItemBegin,
    /// After an item has been processed
    ItemEnd,
    /// When a handler breaks the list
    BreakList,
    /// When the source returned no URL for an item
    ItemMissingUrl,
}

impl EventName {
    /// Stable string form of the name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ListBegin => "on_page_begin",
            Self::ListEnd => "on_list_end",
            Self::ItemBegin => "on_item_begin",
            Self::ItemEnd => "on_item_end",
            Self::BreakList => "on_break_list",
            Self::ItemMissingUrl => "on_item_missing_url",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value that can be dispatched through the [`EventBus`](super::EventBus)
pub trait Event: Any {
    /// Name handlers subscribe to
    fn name() -> EventName
    where
        Self: Sized;
}

// ============================================================================
// Flow Control
// ============================================================================

/// How the scraper should proceed after a breakable event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControl {
    /// Proceed as normal
    #[default]
    Continue,
    /// Skip the current item (or page), continue with the list
    Skip,
    /// Stop the whole list
    Break,
}

/// Events that carry a [`FlowControl`] signal
pub trait Breakable {
    /// Current signal
    fn flow(&self) -> FlowControl;

    /// Replace the signal
    fn set_flow(&mut self, flow: FlowControl);

    /// Skip the current item, continue with the list
    fn skip(&mut self) {
        self.set_flow(FlowControl::Skip);
    }

    /// Stop the list
    fn break_list(&mut self) {
        self.set_flow(FlowControl::Break);
    }

    /// Proceed as normal
    fn proceed(&mut self) {
        self.set_flow(FlowControl::Continue);
    }

    /// Check if the current item should be skipped
    fn should_skip(&self) -> bool {
        self.flow() == FlowControl::Skip
    }

    /// Check if the list should be stopped
    fn should_break(&self) -> bool {
        self.flow() == FlowControl::Break
    }
}

// ============================================================================
// List Events
// ============================================================================

/// Triggered before a list page is fetched
#[derive(Debug, Clone)]
pub struct ListBeginEvent {
    page_num: u32,
    flow: FlowControl,
}

impl ListBeginEvent {
    /// Create a new event for a page
    pub fn new(page_num: u32) -> Self {
        Self {
            page_num,
            flow: FlowControl::default(),
        }
    }

    /// Page about to be fetched
    pub fn page_num(&self) -> u32 {
        self.page_num
    }
}

/// Triggered after a list page has been processed
#[derive(Debug, Clone)]
pub struct ListEndEvent {
    item_count: ItemCount,
    will_continue: bool,
    flow: FlowControl,
}

impl ListEndEvent {
    /// Create a new event
    pub fn new(item_count: ItemCount, will_continue: bool) -> Self {
        Self {
            item_count,
            will_continue,
            flow: FlowControl::default(),
        }
    }

    /// Counters after the page
    pub fn item_count(&self) -> &ItemCount {
        &self.item_count
    }

    /// Whether the scraper believes there are more pages
    pub fn will_continue(&self) -> bool {
        self.will_continue
    }
}

/// Triggered once when a handler breaks the list
#[derive(Debug, Clone)]
pub struct BreakListEvent<R> {
    causing_event: Option<ItemBeginEvent<R>>,
}

impl<R> BreakListEvent<R> {
    /// Create a new event
    pub fn new(causing_event: Option<ItemBeginEvent<R>>) -> Self {
        Self { causing_event }
    }

    /// The event whose handler requested the break
    pub fn causing_event(&self) -> Option<&ItemBeginEvent<R>> {
        self.causing_event.as_ref()
    }
}

// ============================================================================
// Item Events
// ============================================================================

/// Triggered before an item is downloaded
#[derive(Debug, Clone)]
pub struct ItemBeginEvent<R> {
    id: String,
    url: String,
    item_ref: R,
    flow: FlowControl,
}

impl<R> ItemBeginEvent<R> {
    /// Create a new event
    pub fn new(id: impl Into<String>, url: impl Into<String>, item_ref: R) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            item_ref,
            flow: FlowControl::default(),
        }
    }

    /// Item ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Item URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Reference to the item in the list page
    pub fn item_ref(&self) -> &R {
        &self.item_ref
    }
}

/// Triggered when the source returned no URL for an item.
///
/// A handler may recover by calling [`set_url`](Self::set_url).
#[derive(Debug, Clone)]
pub struct ItemMissingUrlEvent<R> {
    item_ref: R,
    url: Option<String>,
}

impl<R> ItemMissingUrlEvent<R> {
    /// Create a new event
    pub fn new(item_ref: R) -> Self {
        Self {
            item_ref,
            url: None,
        }
    }

    /// Reference to the item in the list page
    pub fn item_ref(&self) -> &R {
        &self.item_ref
    }

    /// Recovered URL, if any
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Provide a URL for the item.
    ///
    /// Only the first handler to recover the URL wins; later calls are
    /// ignored and return `false`.
    pub fn set_url(&mut self, url: impl Into<String>) -> bool {
        if self.url.is_some() {
            return false;
        }
        self.url = Some(url.into());
        true
    }

    /// Split the event back into the item reference and recovered URL
    pub fn into_parts(self) -> (R, Option<String>) {
        (self.item_ref, self.url)
    }
}

/// Triggered after an item has been processed.
///
/// Handlers may override the outcome with [`set_state`](Self::set_state)
/// and claim the produced item with [`take_item`](Self::take_item).
#[derive(Debug, Clone)]
pub struct ItemEndEvent<T> {
    item: Option<T>,
    item_count: ItemCount,
    state: ItemState,
    id: String,
    url: String,
}

impl<T> ItemEndEvent<T> {
    /// Create a new event
    pub fn new(
        item: Option<T>,
        item_count: ItemCount,
        state: ItemState,
        id: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            item,
            item_count,
            state,
            id: id.into(),
            url: url.into(),
        }
    }

    /// The produced item, unless it failed or was already taken
    pub fn item(&self) -> Option<&T> {
        self.item.as_ref()
    }

    /// Take ownership of the produced item.
    ///
    /// The item-end log record then sees no item, even for an `Ok` state.
    pub fn take_item(&mut self) -> Option<T> {
        self.item.take()
    }

    /// Counters at the time the item ended
    pub fn item_count(&self) -> &ItemCount {
        &self.item_count
    }

    /// Outcome of the item
    pub fn state(&self) -> ItemState {
        self.state
    }

    /// Override the outcome
    pub fn set_state(&mut self, state: ItemState) {
        self.state = state;
    }

    /// Item ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Item URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Breakable for ListBeginEvent {
    fn flow(&self) -> FlowControl {
        self.flow
    }

    fn set_flow(&mut self, flow: FlowControl) {
        self.flow = flow;
    }
}

impl Breakable for ListEndEvent {
    fn flow(&self) -> FlowControl {
        self.flow
    }

    fn set_flow(&mut self, flow: FlowControl) {
        self.flow = flow;
    }
}

impl<R> Breakable for ItemBeginEvent<R> {
    fn flow(&self) -> FlowControl {
        self.flow
    }

    fn set_flow(&mut self, flow: FlowControl) {
        self.flow = flow;
    }
}

impl Event for ListBeginEvent {
    fn name() -> EventName {
        EventName::ListBegin
    }
}

impl Event for ListEndEvent {
    fn name() -> EventName {
        EventName::ListEnd
    }
}

impl<R: 'static> Event for BreakListEvent<R> {
    fn name() -> EventName {
        EventName::BreakList
    }
}

impl<R: 'static> Event for ItemBeginEvent<R> {
    fn name() -> EventName {
        EventName::ItemBegin
    }
}

impl<R: 'static> Event for ItemMissingUrlEvent<R> {
    fn name() -> EventName {
        EventName::ItemMissingUrl
    }
}

impl<T: 'static> Event for ItemEndEvent<T> {
    fn name() -> EventName {
        EventName::ItemEnd
    }
}
