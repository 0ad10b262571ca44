//! Binance spot REST adapter

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use termcrypto_core::{Candle, CandleInterval, Credentials, Price, Ticker};
use tracing::debug;

use super::{Exchange, OneOrMany, parse_decimal};
use crate::config::AdapterOptions;
use crate::error::{ExchangeError, RestError};
use crate::rate_limit::RateLimiter;
use crate::rest_client::RestClient;
use crate::retry::{AttemptError, RetryPolicy};

pub const BINANCE_REST_URL: &str = "https://api.binance.com";

const API_KEY_HEADER: &str = "X-MBX-APIKEY";
const INVALID_SYMBOL_CODE: i64 = -1121;
const DEFAULT_QUOTE: &str = "USDT";
const BARE_SYMBOL_MAX_LEN: usize = 4;
const MAX_KLINES: u16 = 1000;

/// `btc`, `BTC/USDT`, `btc-usdt` and `BTC_USDT` all become `BTCUSDT`.
/// Short inputs without a quote get `USDT` appended.
pub fn normalize_binance_symbol(raw: &str) -> String {
    let mut symbol: String = raw
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| !matches!(c, '/' | '-' | '_'))
        .collect();

    if symbol.len() <= BARE_SYMBOL_MAX_LEN && !symbol.ends_with(DEFAULT_QUOTE) {
        symbol.push_str(DEFAULT_QUOTE);
    }
    symbol
}

// Wire types

#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(default)]
    price: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker24hResponse {
    price_change: String,
    last_price: String,
    high_price: String,
    low_price: String,
    volume: String,
}

/// Binance spot exchange
pub struct BinanceAdapter {
    rest: RestClient,
    limiter: RateLimiter,
    retry: RetryPolicy,
}

impl BinanceAdapter {
    pub fn new(credentials: &Credentials, options: AdapterOptions) -> Result<Self, ExchangeError> {
        let base_url = options.resolve_base_url(BINANCE_REST_URL);
        let rest = RestClient::new(base_url, options.request_timeout)
            .map_err(|e| ExchangeError::Configuration(e.to_string()))?
            .with_api_key(API_KEY_HEADER, &credentials.api_key);

        debug!(
            "binance adapter at {} (authenticated: {})",
            rest.base_url(),
            rest.is_authenticated()
        );

        Ok(BinanceAdapter {
            rest,
            limiter: RateLimiter::new(options.rate_limit, options.cancel),
            retry: options.retry,
        })
    }

    /// One rate-limited, retried GET
    async fn fetch<T>(
        &self,
        operation: &str,
        path: &str,
        symbol: &str,
        query: Vec<(&str, String)>,
    ) -> Result<T, ExchangeError>
    where
        T: DeserializeOwned + Send,
    {
        self.limiter.acquire().await?;

        let rest = &self.rest;
        let query = &query;
        self.retry
            .run(operation, |_| async move {
                rest.get::<T>(path, query)
                    .await
                    .map_err(|e| classify(e, symbol))
            })
            .await
    }
}

/// Unknown symbols and undecodable payloads are final; everything else is
/// worth another attempt
fn classify(err: RestError, symbol: &str) -> AttemptError {
    match err {
        RestError::Api {
            code: INVALID_SYMBOL_CODE,
            ..
        } => AttemptError::Terminal(ExchangeError::NoDataForSymbol(symbol.to_string())),
        RestError::Parse(msg) => AttemptError::Terminal(ExchangeError::Parse(msg)),
        other => AttemptError::Retryable(other),
    }
}

fn parse_kline(row: &[Value]) -> Result<Candle, ExchangeError> {
    let open_time = row
        .first()
        .and_then(Value::as_i64)
        .ok_or_else(|| ExchangeError::Parse("kline missing open time".to_string()))?;
    let time = Utc
        .timestamp_millis_opt(open_time)
        .single()
        .ok_or_else(|| ExchangeError::Parse(format!("kline open time out of range: {}", open_time)))?;

    let field = |idx: usize, name: &str| -> Result<Decimal, ExchangeError> {
        let raw = row
            .get(idx)
            .and_then(Value::as_str)
            .ok_or_else(|| ExchangeError::Parse(format!("kline missing {}", name)))?;
        parse_decimal(name, raw)
    };

    Ok(Candle {
        time,
        open: field(1, "open")?,
        high: field(2, "high")?,
        low: field(3, "low")?,
        close: field(4, "close")?,
        volume: field(5, "volume")?,
    })
}

#[async_trait]
impl Exchange for BinanceAdapter {
    fn name(&self) -> &str {
        "binance"
    }

    fn normalize_symbol(&self, raw: &str) -> String {
        normalize_binance_symbol(raw)
    }

    async fn get_price(&self, symbol: &str) -> Result<Price, ExchangeError> {
        let symbol = self.normalize_symbol(symbol);
        let resp: OneOrMany<PriceResponse> = self
            .fetch(
                "binance price",
                "/api/v3/ticker/price",
                &symbol,
                vec![("symbol", symbol.clone())],
            )
            .await?;

        let raw = resp
            .into_first()
            .and_then(|p| p.price)
            .ok_or_else(|| ExchangeError::NoDataForSymbol(symbol.clone()))?;
        parse_decimal("price", &raw)
    }

    async fn get_ticker(&self, symbol: &str) -> Result<Ticker, ExchangeError> {
        let symbol = self.normalize_symbol(symbol);
        let resp: OneOrMany<Ticker24hResponse> = self
            .fetch(
                "binance ticker",
                "/api/v3/ticker/24hr",
                &symbol,
                vec![("symbol", symbol.clone())],
            )
            .await?;

        let stats = resp
            .into_first()
            .ok_or_else(|| ExchangeError::NoDataForSymbol(symbol.clone()))?;

        Ok(Ticker {
            price: parse_decimal("lastPrice", &stats.last_price)?,
            change_24h: parse_decimal("priceChange", &stats.price_change)?,
            volume_24h: parse_decimal("volume", &stats.volume)?,
            high_24h: parse_decimal("highPrice", &stats.high_price)?,
            low_24h: parse_decimal("lowPrice", &stats.low_price)?,
            last_updated: Utc::now(),
            approximate: false,
            symbol,
        })
    }

    async fn get_candles(
        &self,
        symbol: &str,
        interval: CandleInterval,
        limit: u16,
    ) -> Result<Vec<Candle>, ExchangeError> {
        let symbol = self.normalize_symbol(symbol);
        let limit = limit.clamp(1, MAX_KLINES);
        let rows: Vec<Vec<Value>> = self
            .fetch(
                "binance klines",
                "/api/v3/klines",
                &symbol,
                vec![
                    ("symbol", symbol.clone()),
                    ("interval", interval.as_str().to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        rows.iter().map(|row| parse_kline(row)).collect()
    }
}
