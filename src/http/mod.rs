//! HTTP module
//!
//! Provides the transport used to fetch list pages and items.
//!
//! # Features
//!
//! - **Transport trait**: The scraper only depends on `Transport::get`
//! - **HttpClient**: reqwest-backed transport with default headers
//! - **Retry Policy**: Fixed-delay retries on connectivity failures
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Browser Headers**: Preset request headers that mimic a browser

mod client;
mod headers;
mod rate_limit;
mod retry;
mod transport;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use headers::{BrowserHeaders, DEFAULT_USER_AGENT};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use retry::RetryPolicy;
pub use transport::{FetchResponse, Transport};
