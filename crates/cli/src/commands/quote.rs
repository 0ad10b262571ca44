use anyhow::Context;
use chrono::Local;
use std::io::Write;
use termcrypto_core::{Candle, CandleInterval};
use termcrypto_gateway::Exchange;
use tracing::{debug, warn};

use crate::render::quote_card;

/// One hour candles covering the last day
const CHART_CANDLES: u16 = 24;

/// Candles for the mini chart, or `None` when the exchange cannot provide them
pub async fn fetch_chart(exchange: &dyn Exchange, symbol: &str) -> Option<Vec<Candle>> {
    match exchange
        .get_candles(symbol, CandleInterval::OneHour, CHART_CANDLES)
        .await
    {
        Ok(candles) => Some(candles),
        Err(e) if e.is_unsupported_operation() => {
            debug!("{} offers no candles, skipping chart", exchange.name());
            None
        }
        Err(e) => {
            warn!("skipping chart for {}: {}", symbol, e);
            None
        }
    }
}

pub async fn run<W: Write>(
    exchange: &dyn Exchange,
    symbol: &str,
    decimals: u32,
    out: &mut W,
) -> anyhow::Result<()> {
    let ticker = exchange
        .get_ticker(symbol)
        .await
        .with_context(|| format!("failed to fetch quote for {}", symbol))?;
    let candles = fetch_chart(exchange, symbol).await;

    let card = quote_card(
        &ticker,
        candles.as_deref(),
        exchange.name(),
        decimals,
        Local::now(),
    );
    write!(out, "{}", card)?;
    out.flush()?;
    Ok(())
}
