//! Log record and sink trait

use crate::error::Error;
use crate::types::{ItemCount, ItemState};

/// One milestone reported by the scraper
#[derive(Debug)]
pub enum LogRecord<'a, T> {
    /// A list page is about to be fetched
    ListBegin {
        /// Page number
        page_num: u32,
    },
    /// A list page has been processed
    ListEnd {
        /// Counters after the page
        item_count: &'a ItemCount,
        /// Whether another page follows
        will_continue: bool,
    },
    /// An item is about to be processed
    ItemBegin {
        /// Item ID, `None` when the URL was missing
        id: Option<&'a str>,
        /// Item URL, `None` when the URL was missing
        url: Option<&'a str>,
    },
    /// An item has been processed
    ItemEnd {
        /// The produced item, if it is still held by the scraper.
        ///
        /// `None` with an `Ok` state means an `ItemEndEvent` handler took
        /// ownership of the item.
        item: Option<&'a T>,
        /// Final outcome
        state: ItemState,
    },
    /// A handler stopped the list
    BreakList,
    /// An error was absorbed or is about to be propagated
    Exception {
        /// The error
        error: &'a Error,
        /// URL being processed when the error occurred
        url: Option<&'a str>,
    },
    /// Free-form message
    Message(&'a str),
}

impl<T> LogRecord<'_, T> {
    /// Short name of the record kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ListBegin { .. } => "list_begin",
            Self::ListEnd { .. } => "list_end",
            Self::ItemBegin { .. } => "item_begin",
            Self::ItemEnd { .. } => "item_end",
            Self::BreakList => "break_list",
            Self::Exception { .. } => "exception",
            Self::Message(_) => "message",
        }
    }
}

/// Consumer of scrape milestones.
///
/// Sinks are side-effect only; nothing they do feeds back into the scraper.
pub trait LogSink<T>: Send + Sync {
    /// Consume one record
    fn emit(&self, record: LogRecord<'_, T>);
}
