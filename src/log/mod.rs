//! Scrape log module
//!
//! Structured milestone records and the sinks that consume them.
//!
//! # Overview
//!
//! The scraper reports every milestone as a [`LogRecord`] passed to a single
//! [`LogSink::emit`] call. Provided sinks:
//! - `TracingSink` - Forwards records to `tracing` (default)
//! - `ConsoleSink` - Compact progress output (`1: ..sf. (20 / 95)`)
//! - `FnSink` - Wraps a closure
//! - `NullSink` - Discards everything

mod sinks;
mod types;

pub use sinks::{ConsoleSink, FnSink, NullSink, TracingSink};
pub use types::{LogRecord, LogSink};
