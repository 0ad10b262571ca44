use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use termcrypto_gateway::{AdapterOptions, Exchange};
use termcrypto_runner::{RefreshLoop, WatchConfig};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::AppContext;
use crate::render::{BoardView, TerminalBoard, spawn_quit_listener};

pub async fn run(
    ctx: &AppContext,
    symbols: Vec<String>,
    interval: Option<u64>,
    iterations: Option<u64>,
) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let exchange: Arc<dyn Exchange> =
        Arc::from(ctx.exchange(AdapterOptions::default().with_cancel(cancel.clone()))?);

    let interval_secs = interval.unwrap_or_else(|| ctx.config.refresh_interval_secs());
    let mut config = WatchConfig::new(symbols, Duration::from_secs(interval_secs));
    if let Some(max_ticks) = iterations {
        config = config.with_max_ticks(max_ticks);
    }
    let refresh = RefreshLoop::new(exchange, config)?;

    debug!(exchange = %ctx.exchange_name, "opening watch board");

    let view = BoardView {
        exchange: ctx.exchange_name.clone(),
        interval_secs,
        decimals: ctx.decimals(),
    };
    let mut board = TerminalBoard::stdout(view).context("failed to set up the terminal")?;

    let listener = board
        .is_interactive()
        .then(|| spawn_quit_listener(cancel.clone()));
    let signal = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let result = refresh.run(&mut board, cancel.clone()).await;

    // Restore the terminal before anything else is printed
    cancel.cancel();
    drop(board);
    signal.abort();
    if let Some(listener) = listener {
        let _ = listener.await;
    }

    if let Err(e) = result {
        error!("watch terminated: {}", e);
        return Err(e).context("live price watch failed");
    }
    Ok(())
}
