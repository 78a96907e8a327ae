//! Lifecycle events module
//!
//! Events emitted while scraping a list, and the bus that dispatches them.
//!
//! # Overview
//!
//! The events module provides:
//! - `FlowControl` - Continue/Skip/Break signal carried by breakable events
//! - Event types for list and item milestones
//! - `EventBus` - Named publish/subscribe with ordered, synchronous handlers
//!
//! Events are owned values: the scraper moves an event into
//! [`EventBus::trigger`], every handler mutates it in turn, and the scraper
//! reads the result from the returned value.

mod bus;
mod types;

pub use bus::{EventBus, Handler};
pub use types::{
    Breakable, BreakListEvent, Event, EventName, FlowControl, ItemBeginEvent, ItemEndEvent,
    ItemMissingUrlEvent, ListBeginEvent, ListEndEvent,
};
