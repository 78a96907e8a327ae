//! Bounded retry for transient connectivity failures
//!
//! Only connectivity failures ([`Error::is_connectivity`]) are retried.
//! An HTTP error status means the server answered, so it is returned as is.
//!
//! [`Error::is_connectivity`]: crate::error::Error::is_connectivity

use super::transport::{FetchResponse, Transport};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Fixed-delay retry policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Pause between attempts
    #[serde(rename = "retry_delay_secs", with = "duration_secs")]
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Create a new policy
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
        }
    }

    /// Policy that makes a single attempt
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Set the number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the delay between attempts
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Run `operation` until it succeeds, fails with a non-connectivity
    /// error, or `max_retries + 1` attempts have failed.
    ///
    /// The last error is returned unchanged.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut retries = 0;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_connectivity() && retries < self.max_retries => {
                    retries += 1;
                    warn!(
                        "Connection failed, retrying in {:?} (attempt {}/{}): {}",
                        self.retry_delay, retries, self.max_retries, e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// GET a URL through `transport` under this policy
    pub async fn get(&self, transport: &dyn Transport, url: &str) -> Result<FetchResponse> {
        self.execute(|| transport.get(url)).await
    }
}

/// Serialize a `Duration` as fractional seconds
mod duration_secs {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|e| {
            D::Error::custom(format!(
                "retry delay must be a non-negative number of seconds, got {secs}: {e}"
            ))
        })
    }
}
