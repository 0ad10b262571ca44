use futures_util::future::join_all;
use std::io::Write;
use termcrypto_core::Price;
use termcrypto_gateway::Exchange;

use crate::render::price_report;

/// Fetch every symbol concurrently; failures are shown next to their symbol
pub async fn fetch_prices(
    exchange: &dyn Exchange,
    symbols: &[String],
) -> Vec<(String, Result<Price, String>)> {
    let fetches = symbols.iter().map(|raw| async move {
        let symbol = exchange.normalize_symbol(raw);
        let result = exchange.get_price(raw).await.map_err(|e| e.to_string());
        (symbol, result)
    });
    join_all(fetches).await
}

pub async fn run<W: Write>(
    exchange: &dyn Exchange,
    symbols: &[String],
    decimals: u32,
    out: &mut W,
) -> anyhow::Result<()> {
    let rows = fetch_prices(exchange, symbols).await;
    write!(out, "{}", price_report(exchange.name(), &rows, decimals))?;
    out.flush()?;
    Ok(())
}
