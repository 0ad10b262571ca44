//! Integration test: command output against an in-memory exchange

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use termcrypto::commands::{price, quote, ticker};
use termcrypto_core::{Candle, CandleInterval, Price, Ticker};
use termcrypto_gateway::{Exchange, ExchangeError};

// ============================================================================
// Test Fixtures
// ============================================================================

struct FakeExchange {
    prices: HashMap<String, Decimal>,
    candles: bool,
}

impl FakeExchange {
    fn new(candles: bool) -> Self {
        let prices = [("BTCUSDT", dec!(50000)), ("ETHUSDT", dec!(3000.25))]
            .into_iter()
            .map(|(s, p)| (s.to_string(), p))
            .collect();
        FakeExchange { prices, candles }
    }

    fn lookup(&self, raw: &str) -> Result<(String, Decimal), ExchangeError> {
        let symbol = self.normalize_symbol(raw);
        match self.prices.get(&symbol) {
            Some(price) => Ok((symbol, *price)),
            None => Err(ExchangeError::NoDataForSymbol(symbol)),
        }
    }
}

#[async_trait]
impl Exchange for FakeExchange {
    fn name(&self) -> &str {
        "fake"
    }

    fn normalize_symbol(&self, raw: &str) -> String {
        let mut symbol = raw.trim().to_uppercase();
        if !symbol.ends_with("USDT") {
            symbol.push_str("USDT");
        }
        symbol
    }

    async fn get_price(&self, symbol: &str) -> Result<Price, ExchangeError> {
        self.lookup(symbol).map(|(_, price)| price)
    }

    async fn get_ticker(&self, symbol: &str) -> Result<Ticker, ExchangeError> {
        let (symbol, price) = self.lookup(symbol)?;
        Ok(Ticker {
            symbol,
            price,
            change_24h: dec!(1000),
            volume_24h: dec!(2500000),
            high_24h: price + dec!(500),
            low_24h: price - dec!(1500),
            last_updated: Utc::now(),
            approximate: false,
        })
    }

    async fn get_candles(
        &self,
        symbol: &str,
        _interval: CandleInterval,
        limit: u16,
    ) -> Result<Vec<Candle>, ExchangeError> {
        if !self.candles {
            return Err(ExchangeError::UnsupportedOperation {
                exchange: "fake".to_string(),
                operation: "candles",
            });
        }
        let (_, price) = self.lookup(symbol)?;
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        Ok((0..limit as i64)
            .map(|i| {
                let open = price + Decimal::from(i);
                Candle {
                    time: start + Duration::hours(i),
                    open,
                    high: open + dec!(2),
                    low: open - dec!(1),
                    close: open + dec!(1),
                    volume: dec!(10),
                }
            })
            .collect())
    }
}

fn symbols(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

fn output(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_price_command_reports_each_symbol() {
    colored::control::set_override(false);
    let exchange = FakeExchange::new(true);
    let mut out = Vec::new();

    price::run(&exchange, &symbols(&["btc", "eth", "invalidxyz"]), 2, &mut out)
        .await
        .unwrap();

    let text = output(out);
    assert!(text.starts_with("Prices from FAKE:"));
    assert!(text.contains("BTCUSDT: $50000.00"));
    assert!(text.contains("ETHUSDT: $3000.25"));
    assert!(text.contains("INVALIDXYZUSDT: Error: no data returned for symbol: INVALIDXYZUSDT"));

    // Input order is kept
    let btc = text.find("BTCUSDT").unwrap();
    let eth = text.find("ETHUSDT").unwrap();
    assert!(btc < eth);
}

#[tokio::test]
async fn test_ticker_command() {
    colored::control::set_override(false);
    let exchange = FakeExchange::new(true);
    let mut out = Vec::new();

    ticker::run(&exchange, &symbols(&["btc", "nope"]), 2, &mut out)
        .await
        .unwrap();

    let text = output(out);
    assert!(text.contains("24h Market Data from FAKE:"));
    assert!(text.contains("24h Change:  +$1000.00 (+2.04%)"));
    assert!(text.contains("24h High:    $50500.00"));
    assert!(text.contains("24h Low:     $48500.00"));
    assert!(text.contains("24h Volume:  2.50M"));
    assert!(text.contains("NOPEUSDT: Error:"));
}

#[tokio::test]
async fn test_quote_with_chart() {
    colored::control::set_override(false);
    let exchange = FakeExchange::new(true);
    let mut out = Vec::new();

    quote::run(&exchange, "btc", 2, &mut out).await.unwrap();

    let text = output(out);
    assert!(text.contains("BTCUSDT Live Quote"));
    assert!(text.contains("24h trend"));
    assert!(text.contains('█'));
    assert!(text.contains("Source: FAKE"));
}

#[tokio::test]
async fn test_quote_skips_chart_when_candles_unsupported() {
    colored::control::set_override(false);
    let exchange = FakeExchange::new(false);
    let mut out = Vec::new();

    quote::run(&exchange, "btc", 2, &mut out).await.unwrap();

    let text = output(out);
    assert!(text.contains("BTCUSDT Live Quote"));
    assert!(!text.contains("24h trend"));
    assert!(quote::fetch_chart(&exchange, "btc").await.is_none());
}

#[tokio::test]
async fn test_quote_fails_for_unknown_symbol() {
    let exchange = FakeExchange::new(true);
    let mut out = Vec::new();

    let err = quote::run(&exchange, "nope", 2, &mut out).await.unwrap_err();
    assert!(format!("{:#}", err).contains("no data returned for symbol: NOPEUSDT"));
    assert!(out.is_empty());
}
