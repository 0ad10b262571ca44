//! terminalcrypto Gateway
//!
//! Exchange access layer. Provides:
//! - A uniform `Exchange` trait (price, 24h ticker, candles, symbol normalization)
//! - Per-exchange REST adapters (Binance, Coinbase)
//! - A name-keyed factory that builds adapters from credentials
//! - Token-bucket rate limiting and bounded retry with linear backoff
//!
//! ## Architecture
//!
//! ```text
//!   CLI / refresh loop
//!          │  ExchangeFactory::create("binance", key, secret)
//!     ┌────▼──────────────────────────────┐
//!     │        Box<dyn Exchange>          │
//!     │  ┌─────────────┐ ┌─────────────┐  │
//!     │  │ RateLimiter │ │ RetryPolicy │  │
//!     │  └──────┬──────┘ └──────┬──────┘  │
//!     │         └───────┬───────┘         │
//!     │           ┌─────▼─────┐           │
//!     │           │ RestClient│           │
//!     │           └─────┬─────┘           │
//!     └─────────────────┼─────────────────┘
//!                       │ HTTPS GET
//!              Binance / Coinbase REST
//! ```
//!
//! Adapters translate each exchange's wire format into the shared
//! `termcrypto_core` model. Returned symbols are always in the adapter's
//! normalized form.

pub mod adapters;
pub mod config;
pub mod error;
pub mod factory;
pub mod rate_limit;
pub mod rest_client;
pub mod retry;

// Re-export commonly used types
pub use adapters::{BinanceAdapter, CoinbaseAdapter, Exchange};
pub use config::{AdapterOptions, RateLimitConfig};
pub use error::{ExchangeError, RestError};
pub use factory::ExchangeFactory;
pub use rate_limit::RateLimiter;
pub use rest_client::RestClient;
pub use retry::{AttemptError, RetryPolicy};
