//! Coinbase v2 public price adapter
//!
//! The v2 API exposes only spot prices. Tickers are approximated from the
//! spot price and flagged as such; candles are not available.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use termcrypto_core::{Candle, CandleInterval, Credentials, Price, Ticker};
use tracing::debug;

use super::{Exchange, parse_decimal};
use crate::config::AdapterOptions;
use crate::error::{ExchangeError, RestError};
use crate::rate_limit::RateLimiter;
use crate::rest_client::RestClient;
use crate::retry::{AttemptError, RetryPolicy};

pub const COINBASE_REST_URL: &str = "https://api.coinbase.com/v2";

const API_KEY_HEADER: &str = "CB-ACCESS-KEY";
const DEFAULT_QUOTE: &str = "USD";
const BARE_SYMBOL_MAX_LEN: usize = 5;

/// `btc` becomes `BTC-USD`; `/` and `_` separators become `-`.
pub fn normalize_coinbase_symbol(raw: &str) -> String {
    let mut symbol = raw.trim().to_uppercase().replace(['/', '_'], "-");

    if !symbol.contains('-') && symbol.chars().count() <= BARE_SYMBOL_MAX_LEN {
        symbol.push('-');
        symbol.push_str(DEFAULT_QUOTE);
    }
    symbol
}

/// Normalized pair, if it is safe to place in a URL path segment
fn path_pair(raw: &str) -> Result<String, ExchangeError> {
    let pair = normalize_coinbase_symbol(raw);
    let valid = !pair.starts_with('-')
        && !pair.ends_with('-')
        && pair.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid {
        return Err(ExchangeError::NoDataForSymbol(pair));
    }
    Ok(pair)
}

/// Half-width of the high/low band reported for approximated tickers
fn approximate_band() -> Decimal {
    Decimal::new(5, 2)
}

#[derive(Debug, Deserialize)]
struct SpotResponse {
    #[serde(default)]
    data: Option<SpotData>,
}

#[derive(Debug, Deserialize)]
struct SpotData {
    #[serde(default)]
    amount: Option<String>,
}

/// Coinbase spot prices
pub struct CoinbaseAdapter {
    rest: RestClient,
    limiter: RateLimiter,
    retry: RetryPolicy,
}

impl CoinbaseAdapter {
    pub fn new(credentials: &Credentials, options: AdapterOptions) -> Result<Self, ExchangeError> {
        let base_url = options.resolve_base_url(COINBASE_REST_URL);
        let rest = RestClient::new(base_url, options.request_timeout)
            .map_err(|e| ExchangeError::Configuration(e.to_string()))?
            .with_api_key(API_KEY_HEADER, &credentials.api_key);

        debug!(
            "coinbase adapter at {} (authenticated: {})",
            rest.base_url(),
            rest.is_authenticated()
        );

        Ok(CoinbaseAdapter {
            rest,
            limiter: RateLimiter::new(options.rate_limit, options.cancel),
            retry: options.retry,
        })
    }

    /// Spot price of an already-normalized pair, without taking a token
    async fn spot_price(&self, pair: &str) -> Result<Price, ExchangeError> {
        let rest = &self.rest;
        let path = format!("/prices/{}/spot", pair);
        let path = path.as_str();

        let resp: SpotResponse = self
            .retry
            .run("coinbase spot price", |_| async move {
                rest.get::<SpotResponse>(path, &[])
                    .await
                    .map_err(|e| classify(e, pair))
            })
            .await?;

        let raw = resp
            .data
            .and_then(|d| d.amount)
            .ok_or_else(|| ExchangeError::NoDataForSymbol(pair.to_string()))?;
        parse_decimal("amount", &raw)
    }
}

/// 400/404 mean the pair does not exist; bad payloads are final
fn classify(err: RestError, pair: &str) -> AttemptError {
    match err.status() {
        Some(400) | Some(404) => {
            AttemptError::Terminal(ExchangeError::NoDataForSymbol(pair.to_string()))
        }
        _ => match err {
            RestError::Parse(msg) => AttemptError::Terminal(ExchangeError::Parse(msg)),
            other => AttemptError::Retryable(other),
        },
    }
}

/// Ticker synthesized from a spot price when no 24h statistics exist
///
/// A price too large for the band to be computed is rejected as a bad payload.
fn approximate_ticker(symbol: String, price: Price) -> Result<Ticker, ExchangeError> {
    let band = approximate_band();
    let scaled = |factor: Decimal| {
        price
            .checked_mul(factor)
            .ok_or_else(|| ExchangeError::Parse(format!("spot price {} out of range", price)))
    };
    Ok(Ticker {
        high_24h: scaled(Decimal::ONE + band)?,
        low_24h: scaled(Decimal::ONE - band)?,
        symbol,
        price,
        change_24h: Decimal::ZERO,
        volume_24h: Decimal::ZERO,
        last_updated: Utc::now(),
        approximate: true,
    })
}

#[async_trait]
impl Exchange for CoinbaseAdapter {
    fn name(&self) -> &str {
        "coinbase"
    }

    fn normalize_symbol(&self, raw: &str) -> String {
        normalize_coinbase_symbol(raw)
    }

    async fn get_price(&self, symbol: &str) -> Result<Price, ExchangeError> {
        let pair = path_pair(symbol)?;
        self.limiter.acquire().await?;
        self.spot_price(&pair).await
    }

    async fn get_ticker(&self, symbol: &str) -> Result<Ticker, ExchangeError> {
        let pair = path_pair(symbol)?;
        self.limiter.acquire().await?;
        let price = self.spot_price(&pair).await?;

        debug!("{} has no 24h statistics on coinbase, approximating from spot", pair);
        approximate_ticker(pair, price)
    }

    async fn get_candles(
        &self,
        _symbol: &str,
        _interval: CandleInterval,
        _limit: u16,
    ) -> Result<Vec<Candle>, ExchangeError> {
        Err(ExchangeError::UnsupportedOperation {
            exchange: self.name().to_string(),
            operation: "candles",
        })
    }
}
