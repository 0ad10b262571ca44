use futures_util::future::join_all;
use std::io::Write;
use termcrypto_core::Ticker;
use termcrypto_gateway::Exchange;

use crate::render::ticker_report;

pub async fn fetch_tickers(
    exchange: &dyn Exchange,
    symbols: &[String],
) -> Vec<(String, Result<Ticker, String>)> {
    let fetches = symbols.iter().map(|raw| async move {
        let symbol = exchange.normalize_symbol(raw);
        let result = exchange.get_ticker(raw).await.map_err(|e| e.to_string());
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
    let rows = fetch_tickers(exchange, symbols).await;
    write!(out, "{}", ticker_report(exchange.name(), &rows, decimals))?;
    out.flush()?;
    Ok(())
}
