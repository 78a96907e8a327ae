//! Scraper configuration
//!
//! A configuration file bundles the site definition with the HTTP, retry
//! and pagination settings of a run:
//!
//! ```yaml
//! site:
//!   name: shop
//!   list_url: "https://shop.example.com/api/products?page={{ page }}"
//!   items_path: data.products
//!   item_url: url
//! http:
//!   timeout_seconds: 10
//!   browser_headers: true
//!   rate_limit:
//!     requests_per_second: 2
//! retry:
//!   max_retries: 5
//!   retry_delay_secs: 2.5
//! scrape:
//!   max_pages: 10
//! ```

use crate::engine::ScrapeConfig;
use crate::error::{Error, Result};
use crate::http::{BrowserHeaders, HttpClientConfig, RateLimiterConfig, RetryPolicy};
use crate::site::SiteDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete scraper configuration loaded from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Site definition
    pub site: SiteDefinition,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Retry policy for item downloads
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Pagination settings
    #[serde(default)]
    pub scrape: ScrapeConfig,
}

impl ScraperConfig {
    /// Wrap a site definition with default settings
    pub fn new(site: SiteDefinition) -> Self {
        Self {
            site,
            http: HttpConfig::default(),
            retry: RetryPolicy::default(),
            scrape: ScrapeConfig::default(),
        }
    }

    /// Check the whole configuration
    pub fn validate(&self) -> Result<()> {
        self.site.validate()?;
        self.http.validate()?;

        if self.scrape.start_page == 0 {
            return Err(Error::invalid_value(
                "scrape.start_page",
                "pages are numbered from 1",
            ));
        }
        if self.scrape.max_pages == Some(0) {
            return Err(Error::invalid_value(
                "scrape.max_pages",
                "must be at least 1 (omit for no limit)",
            ));
        }

        Ok(())
    }

    /// Build the HTTP client configuration for this site
    pub fn client_config(&self) -> Result<HttpClientConfig> {
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.http.timeout_seconds));

        if self.http.browser_headers {
            let list_url = url::Url::parse(&self.site.render_list_url(1)?)?;
            let host = list_url.host_str().unwrap_or_default();
            builder = builder.browser_headers(BrowserHeaders::html(host));
        }

        if let Some(agent) = &self.http.user_agent {
            builder = builder.user_agent(agent);
        }

        for (key, value) in &self.http.headers {
            builder = builder.header(key, value);
        }

        if let Some(limit) = &self.http.rate_limit {
            builder = builder.rate_limit(RateLimiterConfig::new(
                limit.requests_per_second,
                limit.burst_size,
            ));
        }

        Ok(builder.build())
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// User agent (overrides the browser preset's)
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Send browser-like headers
    #[serde(default)]
    pub browser_headers: bool,

    /// Extra headers for every request
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Rate limiting (unlimited when absent)
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: None,
            browser_headers: false,
            headers: HashMap::new(),
            rate_limit: None,
        }
    }
}

impl HttpConfig {
    fn validate(&self) -> Result<()> {
        if self.timeout_seconds == 0 {
            return Err(Error::invalid_value(
                "http.timeout_seconds",
                "must be greater than 0",
            ));
        }

        if let Some(limit) = &self.rate_limit {
            if limit.requests_per_second == 0 {
                return Err(Error::invalid_value(
                    "http.rate_limit.requests_per_second",
                    "must be greater than 0",
                ));
            }
        }

        Ok(())
    }
}

fn default_timeout() -> u64 {
    30
}

/// Rate limit settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests per second
    pub requests_per_second: u32,

    /// Burst size
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

fn default_burst() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn site() -> SiteDefinition {
        serde_yaml::from_str(
            r#"
name: shop
list_url: "https://shop.example.com/list?page={{ page }}"
items_path: items
item_url: url
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = ScraperConfig::new(site());
        assert_eq!(config.http.timeout_seconds, 30);
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.scrape.start_page, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_client_config() {
        let mut config = ScraperConfig::new(site());
        config.http.timeout_seconds = 5;
        config.http.browser_headers = true;
        config.http.headers.insert("X-Token".into(), "abc".into());
        config.http.rate_limit = Some(RateLimitConfig {
            requests_per_second: 3,
            burst_size: 2,
        });

        let client = config.client_config().unwrap();
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert_eq!(client.rate_limit, Some(RateLimiterConfig::new(3, 2)));
        assert_eq!(client.default_headers.get("X-Token").unwrap(), "abc");
        assert_eq!(
            client.default_headers.get("Host").map(String::as_str),
            Some("shop.example.com")
        );
        assert_eq!(client.user_agent, crate::http::DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_user_agent_override() {
        let mut config = ScraperConfig::new(site());
        config.http.browser_headers = true;
        config.http.user_agent = Some("my-bot/1.0".into());

        let client = config.client_config().unwrap();
        assert_eq!(client.user_agent, "my-bot/1.0");
    }

    #[test]
    fn test_invalid_values() {
        let mut config = ScraperConfig::new(site());
        config.scrape.start_page = 0;
        assert!(config.validate().is_err());

        let mut config = ScraperConfig::new(site());
        config.scrape.max_pages = Some(0);
        assert!(config.validate().is_err());

        let mut config = ScraperConfig::new(site());
        config.http.timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = ScraperConfig::new(site());
        config.http.rate_limit = Some(RateLimitConfig {
            requests_per_second: 0,
            burst_size: 1,
        });
        assert!(config.validate().is_err());
    }
}
