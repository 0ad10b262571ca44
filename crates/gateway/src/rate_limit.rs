//! Token bucket rate limiter for outbound exchange requests
//!
//! Every network-calling adapter operation acquires one token before issuing
//! its request. A pending acquire returns `RateLimitCancelled` as soon as the
//! limiter's cancellation token fires.

use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::RateLimitConfig;
use crate::error::ExchangeError;

/// Absorbs float drift from refill arithmetic
const TOKEN_EPSILON: f64 = 1e-9;

/// A zero-length sleep would not advance the clock
const MIN_WAIT: Duration = Duration::from_millis(1);

struct TokenBucket {
    tokens: f64,
    capacity: f64,
    refill_rate: f64, // tokens per second
    last_update: Instant,
}

impl TokenBucket {
    fn new(requests_per_second: u32, burst: u32) -> Self {
        let capacity = burst.max(1) as f64;
        TokenBucket {
            tokens: capacity,
            capacity,
            refill_rate: requests_per_second.max(1) as f64,
            last_update: Instant::now(),
        }
    }

    fn try_consume(&mut self, amount: u32) -> (bool, Duration) {
        self.refill();

        let amount_f64 = amount as f64;
        if self.tokens + TOKEN_EPSILON >= amount_f64 {
            self.tokens -= amount_f64;
            (true, Duration::ZERO)
        } else {
            let deficit = amount_f64 - self.tokens;
            let wait_seconds = deficit / self.refill_rate;
            (false, Duration::from_secs_f64(wait_seconds).max(MIN_WAIT))
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update);
        let new_tokens = elapsed.as_secs_f64() * self.refill_rate;
        self.tokens = (self.tokens + new_tokens).min(self.capacity);
        self.last_update = now;
    }

    fn available(&mut self) -> u32 {
        self.refill();
        (self.tokens + TOKEN_EPSILON).max(0.0) as u32
    }
}

/// Per-adapter request limiter
pub struct RateLimiter {
    bucket: Mutex<TokenBucket>,
    config: RateLimitConfig,
    cancel: CancellationToken,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, cancel: CancellationToken) -> Self {
        RateLimiter {
            bucket: Mutex::new(TokenBucket::new(config.requests_per_second, config.burst)),
            config,
            cancel,
        }
    }

    /// Wait until a token is available
    ///
    /// Fails with `RateLimitCancelled` if the cancellation token fires first
    /// (or had already fired).
    pub async fn acquire(&self) -> Result<(), ExchangeError> {
        loop {
            if self.cancel.is_cancelled() {
                return Err(ExchangeError::RateLimitCancelled);
            }

            let (allowed, wait) = self.bucket.lock().try_consume(1);
            if allowed {
                return Ok(());
            }

            debug!("Rate limit reached, waiting {:?}", wait);
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(ExchangeError::RateLimitCancelled),
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    /// Take a token without waiting. Returns false if none is available.
    pub fn try_acquire(&self) -> bool {
        self.bucket.lock().try_consume(1).0
    }

    /// Whole tokens currently in the bucket
    pub fn available(&self) -> u32 {
        self.bucket.lock().available()
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}
