//! Exchange adapters
//!
//! Each adapter implements `Exchange` for one venue: it normalizes symbols
//! into the venue's pair format, rate-limits and retries its own requests,
//! and converts wire responses into the shared core model.

mod binance;
mod coinbase;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use termcrypto_core::{Candle, CandleInterval, Price, Ticker};

use crate::error::ExchangeError;

pub use binance::{BINANCE_REST_URL, BinanceAdapter, normalize_binance_symbol};
pub use coinbase::{COINBASE_REST_URL, CoinbaseAdapter, normalize_coinbase_symbol};

/// Uniform capability set over all supported exchanges
///
/// `symbol` arguments accept user input in any common form (`btc`,
/// `BTC/USDT`, `eth-usd`); adapters normalize before use and return data
/// keyed by the normalized symbol.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Adapter identity, for display and logging
    fn name(&self) -> &str;

    /// Convert a user symbol to this exchange's pair format
    ///
    /// Pure and idempotent: `normalize(normalize(s)) == normalize(s)`.
    fn normalize_symbol(&self, raw: &str) -> String;

    /// Current spot price
    async fn get_price(&self, symbol: &str) -> Result<Price, ExchangeError>;

    /// 24h statistics snapshot
    async fn get_ticker(&self, symbol: &str) -> Result<Ticker, ExchangeError>;

    /// Up to `limit` most recent bars, oldest first
    ///
    /// Fails with `UnsupportedOperation` on exchanges without a candle
    /// endpoint; callers should treat that as "no chart".
    async fn get_candles(
        &self,
        symbol: &str,
        interval: CandleInterval,
        limit: u16,
    ) -> Result<Vec<Candle>, ExchangeError>;
}

/// Response that may be a single object or a list of them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_first(self) -> Option<T> {
        match self {
            OneOrMany::One(item) => Some(item),
            OneOrMany::Many(items) => items.into_iter().next(),
        }
    }
}

/// Parse an exchange decimal string, naming the field on failure
pub(crate) fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, ExchangeError> {
    Decimal::from_str(raw.trim())
        .or_else(|_| Decimal::from_scientific(raw.trim()))
        .map_err(|e| ExchangeError::Parse(format!("invalid {} '{}': {}", field, raw, e)))
}
