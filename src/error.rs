//! Error types for listscraper
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for listscraper
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("Connection to {url} failed: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to fetch list page {url}: {source}")]
    PageFetch {
        url: String,
        #[source]
        source: Box<Error>,
    },

    // ============================================================================
    // Item Errors
    // ============================================================================
    #[error("Bad payload from {url}: response did not decode to a value")]
    BadPayload { url: String, body: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Failed to extract '{field}': {message}")]
    Extract { field: String, message: String },

    #[error("Failed to create downloader for {url}: {message}")]
    Downloader { url: String, message: String },

    // ============================================================================
    // Event Errors
    // ============================================================================
    #[error("Handler for '{event}' failed: {source}")]
    Handler {
        event: String,
        #[source]
        source: Box<Error>,
    },

    // ============================================================================
    // Template Errors
    // ============================================================================
    #[error("Undefined variable in template: {variable}")]
    UndefinedVariable { variable: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a connectivity error
    pub fn connect(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connect {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    /// Wrap an error raised while fetching a list page
    pub fn page_fetch(url: impl Into<String>, source: Error) -> Self {
        Self::PageFetch {
            url: url.into(),
            source: Box::new(source),
        }
    }

    /// Create a bad payload error carrying the raw response body
    pub fn bad_payload(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::BadPayload {
            url: url.into(),
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an extraction error
    pub fn extract(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extract {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a downloader construction error
    pub fn downloader(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Downloader {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Wrap an error returned by an event handler
    pub fn handler(event: impl Into<String>, source: Error) -> Self {
        Self::Handler {
            event: event.into(),
            source: Box::new(source),
        }
    }

    /// Create an undefined variable error
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// Check if this error is a transient connectivity failure.
    ///
    /// Only these are retried; an HTTP error status means the server
    /// answered and is never retried.
    pub fn is_connectivity(&self) -> bool {
        match self {
            Error::Connect { .. } => true,
            Error::Http(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }

    /// Get the raw response body carried by this error, if any
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Error::BadPayload { body, .. } | Error::HttpStatus { body, .. } => Some(body),
            Error::PageFetch { source, .. } | Error::Handler { source, .. } => {
                source.response_body()
            }
            _ => None,
        }
    }
}

/// Result type alias for listscraper
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::http_status(404, "https://example.com/a", "Not found");
        assert_eq!(err.to_string(), "HTTP 404 from https://example.com/a");

        let err = Error::page_fetch(
            "https://example.com/list?page=2",
            Error::connect("https://example.com/list?page=2", "refused"),
        );
        assert!(err
            .to_string()
            .starts_with("Failed to fetch list page https://example.com/list?page=2"));
    }

    #[test]
    fn test_is_connectivity() {
        assert!(Error::connect("http://localhost", "connection refused").is_connectivity());

        assert!(!Error::http_status(500, "http://localhost", "").is_connectivity());
        assert!(!Error::http_status(503, "http://localhost", "").is_connectivity());
        assert!(!Error::bad_payload("http://localhost", "<html>").is_connectivity());
        assert!(!Error::decode("bad").is_connectivity());
        assert!(!Error::config("test").is_connectivity());
    }

    #[test]
    fn test_response_body() {
        let err = Error::bad_payload("http://localhost/item/1", "not json");
        assert_eq!(err.response_body(), Some("not json"));

        let err = Error::page_fetch(
            "http://localhost/list",
            Error::http_status(500, "http://localhost/list", "oops"),
        );
        assert_eq!(err.response_body(), Some("oops"));

        assert_eq!(Error::decode("x").response_body(), None);
    }

    #[test]
    fn test_handler_error_keeps_source() {
        let err = Error::handler("on_item_end", Error::Other("boom".to_string()));
        assert_eq!(err.to_string(), "Handler for 'on_item_end' failed: boom");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
