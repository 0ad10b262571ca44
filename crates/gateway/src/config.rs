//! Adapter configuration
//!
//! Everything an adapter needs beyond credentials is passed in explicitly;
//! adapters never read global state.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::retry::RetryPolicy;

/// Token bucket parameters for outbound requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Sustained rate (tokens refilled per second)
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    /// Bucket size (requests allowed back-to-back)
    #[serde(default = "default_burst")]
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig {
            requests_per_second: default_requests_per_second(),
            burst: default_burst(),
        }
    }
}

impl RateLimitConfig {
    pub fn new(requests_per_second: u32, burst: u32) -> Self {
        RateLimitConfig {
            requests_per_second,
            burst,
        }
    }
}

/// Options shared by every adapter constructor
#[derive(Debug, Clone)]
pub struct AdapterOptions {
    /// Override of the exchange's REST base URL (tests, proxies)
    pub base_url: Option<String>,
    pub rate_limit: RateLimitConfig,
    pub retry: RetryPolicy,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    /// Cancels any pending rate limiter wait
    pub cancel: CancellationToken,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        AdapterOptions {
            base_url: None,
            rate_limit: RateLimitConfig::default(),
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(default_request_timeout_secs()),
            cancel: CancellationToken::new(),
        }
    }
}

impl AdapterOptions {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Base URL to use, falling back to the exchange default
    pub(crate) fn resolve_base_url(&self, default: &str) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(default)
            .trim()
            .trim_end_matches('/')
            .to_string()
    }
}

// Default value functions for serde
fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    10
}

fn default_request_timeout_secs() -> u64 {
    10
}
