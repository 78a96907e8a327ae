//! Event bus implementation
//!
//! Handlers are stored per event name and run synchronously, in
//! registration order, against the same event value.

use super::types::{Event, EventName};
use crate::error::{Error, Result};
use std::any::Any;
use std::collections::HashMap;

/// Boxed handler for events of type `E`
pub type Handler<E> = Box<dyn Fn(&mut E) -> Result<()> + Send + Sync>;

/// Named publish/subscribe dispatcher
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<EventName, Vec<Box<dyn Any + Send + Sync>>>,
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for events of type `E`
    pub fn on<E, F>(&mut self, handler: F) -> &mut Self
    where
        E: Event,
        F: Fn(&mut E) -> Result<()> + Send + Sync + 'static,
    {
        let handler: Handler<E> = Box::new(handler);
        self.handlers
            .entry(E::name())
            .or_default()
            .push(Box::new(handler));
        self
    }

    /// Dispatch an event to every handler registered under its name.
    ///
    /// Returns the event after all handlers ran. The first failing handler
    /// stops the chain and its error is returned.
    pub fn trigger<E: Event>(&self, mut event: E) -> Result<E> {
        let name = E::name();
        let Some(handlers) = self.handlers.get(&name) else {
            return Ok(event);
        };

        // Handlers registered for a different type parameter under the same
        // name never match the downcast.
        for handler in handlers.iter().filter_map(|h| h.downcast_ref::<Handler<E>>()) {
            handler(&mut event).map_err(|e| Error::handler(name.as_str(), e))?;
        }

        Ok(event)
    }

    /// Check if any handler is registered for `E`
    pub fn has_handlers<E: Event>(&self) -> bool {
        self.handler_count(E::name()) > 0
    }

    /// Number of handlers registered under a name
    pub fn handler_count(&self, name: EventName) -> usize {
        self.handlers.get(&name).map_or(0, Vec::len)
    }

    /// Remove every handler for `E`
    pub fn clear<E: Event>(&mut self) {
        self.handlers.remove(&E::name());
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}
