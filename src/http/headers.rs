//! Browser-like request headers
//!
//! Some sites serve different markup (or nothing at all) to clients that
//! do not look like a browser. [`BrowserHeaders`] builds the usual set.

/// Chrome on Windows
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/88.0.4324.104 Safari/537.36";

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,\
    image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9";

const SEC_CH_UA: &str = "\"Chromium\";v=\"88\", \"Google Chrome\";v=\"88\", \";Not A Brand\";v=\"99\"";

/// Ordered header set; setting a header twice keeps the last value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserHeaders {
    host: Option<String>,
    headers: Vec<(String, String)>,
}

impl BrowserHeaders {
    /// Create an empty set for a host
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            headers: Vec::new(),
        }
    }

    /// Full preset for fetching HTML pages from `host`
    pub fn html(host: impl Into<String>) -> Self {
        Self::new(host)
            .with_accept_html()
            .with_accept_language("en-US,en;q=0.9")
            .with_cache_control("no-cache")
            .with_connection("keep-alive")
            .with_host()
            .with_sec_fetch()
            .with_upgrade_insecure_requests()
            .with_user_agent(DEFAULT_USER_AGENT)
    }

    /// Set an arbitrary header
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name, value)),
        }
        self
    }

    /// Set `Accept`
    pub fn with_accept(self, value: impl Into<String>) -> Self {
        self.set("Accept", value)
    }

    /// Set `Accept` to what a browser sends for a page navigation
    pub fn with_accept_html(self) -> Self {
        self.with_accept(HTML_ACCEPT)
    }

    /// Set `Accept` for JSON endpoints
    pub fn with_accept_json(self) -> Self {
        self.with_accept("application/json, text/plain, */*")
    }

    /// Set `Accept-Language`
    pub fn with_accept_language(self, value: impl Into<String>) -> Self {
        self.set("Accept-Language", value)
    }

    /// Set `Cache-Control` and `Pragma`
    pub fn with_cache_control(self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.set("Cache-Control", value.clone()).set("Pragma", value)
    }

    /// Set `Connection`
    pub fn with_connection(self, value: impl Into<String>) -> Self {
        self.set("Connection", value)
    }

    /// Set `Host` and an https `Origin` for the configured host
    pub fn with_host(self) -> Self {
        match self.host.clone() {
            Some(host) => {
                let origin = format!("https://{host}");
                self.set("Host", host).set("Origin", origin)
            }
            None => self,
        }
    }

    /// Set the `sec-ch-ua` and `Sec-Fetch-*` navigation headers
    pub fn with_sec_fetch(self) -> Self {
        self.set("sec-ch-ua", SEC_CH_UA)
            .set("sec-ch-ua-mobile", "?0")
            .set("Sec-Fetch-Dest", "document")
            .set("Sec-Fetch-Mode", "navigate")
            .set("Sec-Fetch-Site", "same-origin")
            .set("Sec-Fetch-User", "?1")
    }

    /// Set `Upgrade-Insecure-Requests`
    pub fn with_upgrade_insecure_requests(self) -> Self {
        self.set("Upgrade-Insecure-Requests", "1")
    }

    /// Set `User-Agent`
    pub fn with_user_agent(self, value: impl Into<String>) -> Self {
        self.set("User-Agent", value)
    }

    /// Look up a header value (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Number of headers
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Check if no header is set
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Consume into `(name, value)` pairs in insertion order
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.headers
    }
}
