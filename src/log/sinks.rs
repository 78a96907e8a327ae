//! Log sink implementations

use super::types::{LogRecord, LogSink};
use crate::types::ItemState;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

// ============================================================================
// Tracing Sink
// ============================================================================

/// Forwards records to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Create a new tracing sink
    pub fn new() -> Self {
        Self
    }
}

impl<T> LogSink<T> for TracingSink {
    fn emit(&self, record: LogRecord<'_, T>) {
        match record {
            LogRecord::ListBegin { page_num } => info!(page = page_num, "Scraping list page"),
            LogRecord::ListEnd {
                item_count,
                will_continue,
            } => info!(
                page = ?item_count.current_page,
                total_items = ?item_count.total_items,
                will_continue,
                "Finished list page"
            ),
            LogRecord::ItemBegin { id, url } => debug!(?id, ?url, "Item started"),
            LogRecord::ItemEnd { item, state } => match state {
                ItemState::Ok | ItemState::Skip => {
                    debug!(%state, has_item = item.is_some(), "Item finished");
                }
                ItemState::Fail | ItemState::MissingData => {
                    warn!(%state, has_item = item.is_some(), "Item finished");
                }
            },
            LogRecord::BreakList => info!("List scraping stopped by handler"),
            LogRecord::Exception { error, url } => error!(?url, "{error}"),
            LogRecord::Message(message) => info!("{message}"),
        }
    }
}

// ============================================================================
// Console Sink
// ============================================================================

/// Compact progress output.
///
/// Each page renders as `<page>: ` followed by one glyph per item
/// (`.` ok, `s` skip, `f` fail, `x` missing data) and either the running
/// count or ` ...done.`. Errors go to the error writer.
pub struct ConsoleSink {
    out: Mutex<Box<dyn Write + Send>>,
    err: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    /// Create a sink writing to the given writers
    pub fn new(out: impl Write + Send + 'static, err: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
            err: Mutex::new(Box::new(err)),
        }
    }

    /// Create a sink writing to stdout and stderr
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }

    /// Create a sink writing everything to stderr
    pub fn stderr() -> Self {
        Self::new(io::stderr(), io::stderr())
    }

    fn write_out(&self, text: &str) {
        write_to(&self.out, text);
    }

    fn write_err(&self, text: &str) {
        write_to(&self.err, text);
    }
}

// Progress output is best effort; a broken pipe must not abort the scrape.
fn write_to(writer: &Mutex<Box<dyn Write + Send>>, text: &str) {
    if let Ok(mut w) = writer.lock() {
        let _ = w.write_all(text.as_bytes());
        let _ = w.flush();
    }
}

impl<T> LogSink<T> for ConsoleSink {
    fn emit(&self, record: LogRecord<'_, T>) {
        match record {
            LogRecord::ListBegin { page_num } => self.write_out(&format!("{page_num}: ")),
            LogRecord::ListEnd {
                item_count,
                will_continue,
            } => {
                let tail = if will_continue {
                    item_count
                        .progress()
                        .map(|(current, total)| format!(" ({current} / {total})"))
                        .unwrap_or_default()
                } else {
                    " ...done.".to_string()
                };
                self.write_out(&format!("{tail}\n"));
            }
            LogRecord::ItemBegin { .. } => {}
            LogRecord::ItemEnd { state, .. } => self.write_out(&state.glyph().to_string()),
            LogRecord::BreakList => self.write_out(" ...break\n"),
            LogRecord::Exception { error, url } => match url {
                Some(url) => self.write_err(&format!("{url}: {error}\n")),
                None => self.write_err(&format!("{error}\n")),
            },
            LogRecord::Message(message) => self.write_out(message),
        }
    }
}

impl std::fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSink").finish_non_exhaustive()
    }
}

// ============================================================================
// Closure & Null Sinks
// ============================================================================

/// Sink backed by a closure
pub struct FnSink<F>(F);

impl<F> FnSink<F> {
    /// Wrap a closure
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<T, F> LogSink<T> for FnSink<F>
where
    F: Fn(LogRecord<'_, T>) + Send + Sync,
{
    fn emit(&self, record: LogRecord<'_, T>) {
        (self.0)(record);
    }
}

/// Discards every record
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl<T> LogSink<T> for NullSink {
    fn emit(&self, _record: LogRecord<'_, T>) {}
}
