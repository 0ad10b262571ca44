//! Refresh loop - periodic re-fetch of a watched symbol set
//!
//! Runs as an explicit state machine:
//!
//! ```text
//!   Scheduled ──tick──▶ Fetching ──all results──▶ Publishing ──render──▶ Scheduled
//!       │                  │                          │
//!       └──────cancel──────┴──────────cancel──────────┴──▶ Stopped
//! ```
//!
//! One tick fans out one price fetch per symbol and waits for all of them
//! before publishing a single `PriceBoard`. Ticks never overlap: if a tick
//! runs past the next timer deadline, the missed deadline is skipped.

use chrono::Utc;
use futures_util::future::join_all;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use termcrypto_core::{Price, Symbol};
use termcrypto_gateway::{Exchange, ExchangeError};
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::board::{PriceBoard, WatchBoard};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Consumer of published boards
pub trait BoardRenderer {
    fn render(&mut self, board: &PriceBoard) -> io::Result<()>;
}

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("no symbols to watch")]
    NoSymbols,

    #[error("refresh interval must be greater than zero")]
    InvalidInterval,

    #[error("price refresh for {symbol} failed: {source}")]
    Exchange {
        symbol: Symbol,
        #[source]
        source: ExchangeError,
    },

    #[error("render failed: {0}")]
    Render(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Raw user symbols; normalized by the exchange before use
    pub symbols: Vec<String>,
    pub interval: Duration,
    /// Stop after this many published ticks
    pub max_ticks: Option<u64>,
}

impl WatchConfig {
    pub fn new(symbols: Vec<String>, interval: Duration) -> Self {
        WatchConfig {
            symbols,
            interval,
            max_ticks: None,
        }
    }

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    TickLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSummary {
    /// Ticks published to the renderer
    pub ticks: u64,
    pub reason: StopReason,
}

type TickResults = Vec<(Symbol, Result<Price, ExchangeError>)>;

enum Phase {
    Scheduled,
    Fetching,
    Publishing(TickResults),
    Stopped(StopReason),
}

pub struct RefreshLoop {
    exchange: Arc<dyn Exchange>,
    board: WatchBoard,
    interval: Duration,
    max_ticks: Option<u64>,
}

impl RefreshLoop {
    pub fn new(exchange: Arc<dyn Exchange>, config: WatchConfig) -> Result<Self, WatchError> {
        if config.interval.is_zero() {
            return Err(WatchError::InvalidInterval);
        }

        let board = WatchBoard::new(
            config
                .symbols
                .iter()
                .map(|raw| exchange.normalize_symbol(raw)),
        );
        if board.is_empty() {
            return Err(WatchError::NoSymbols);
        }

        Ok(RefreshLoop {
            exchange,
            board,
            interval: config.interval,
            max_ticks: config.max_ticks,
        })
    }

    /// Normalized symbols in watch order
    pub fn symbols(&self) -> &[Symbol] {
        self.board.symbols()
    }

    /// Drive the loop until cancelled, the tick limit is hit, or a fatal
    /// exchange error occurs
    ///
    /// The first tick fires immediately. Nothing fetched after `cancel`
    /// fires is rendered.
    pub async fn run<R>(
        mut self,
        renderer: &mut R,
        cancel: CancellationToken,
    ) -> Result<WatchSummary, WatchError>
    where
        R: BoardRenderer + ?Sized,
    {
        info!(
            "watching {} symbol(s) on {} every {:?}",
            self.board.symbols().len(),
            self.exchange.name(),
            self.interval
        );

        let mut timer = tokio::time::interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut ticks = 0u64;
        let mut phase = Phase::Scheduled;

        loop {
            phase = match phase {
                Phase::Scheduled => {
                    if self.max_ticks.is_some_and(|max| ticks >= max) {
                        Phase::Stopped(StopReason::TickLimit)
                    } else {
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => Phase::Stopped(StopReason::Cancelled),
                            _ = timer.tick() => Phase::Fetching,
                        }
                    }
                }

                Phase::Fetching => {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => Phase::Stopped(StopReason::Cancelled),
                        results = self.fetch_all() => Phase::Publishing(results),
                    }
                }

                Phase::Publishing(results) => {
                    if cancel.is_cancelled() {
                        Phase::Stopped(StopReason::Cancelled)
                    } else {
                        match settle(results)? {
                            Some(outcomes) => {
                                let board = self.board.apply(outcomes, Utc::now());
                                ticks += 1;
                                debug!("tick {} published ({} failed)", board.tick, board.failures());
                                renderer.render(&board)?;
                                Phase::Scheduled
                            }
                            None => Phase::Stopped(StopReason::Cancelled),
                        }
                    }
                }

                Phase::Stopped(reason) => {
                    info!("watch stopped after {} tick(s): {:?}", ticks, reason);
                    return Ok(WatchSummary { ticks, reason });
                }
            };
        }
    }

    async fn fetch_all(&self) -> TickResults {
        let exchange = &self.exchange;
        let fetches = self.board.symbols().iter().map(|symbol| async move {
            let result = exchange.get_price(symbol).await;
            (symbol.clone(), result)
        });
        join_all(fetches).await
    }
}

/// Split a tick's raw results into per-symbol outcomes
///
/// Returns `Ok(None)` if any fetch saw the rate limiter cancelled, and an
/// error for the first fatal transport failure.
fn settle(results: TickResults) -> Result<Option<Vec<(Symbol, Result<Price, String>)>>, WatchError> {
    let mut outcomes = Vec::with_capacity(results.len());
    let mut limiter_cancelled = false;

    for (symbol, result) in results {
        match result {
            Ok(price) => outcomes.push((symbol, Ok(price))),
            Err(ExchangeError::RateLimitCancelled) => limiter_cancelled = true,
            Err(err) if err.is_fatal_for_watch() => {
                warn!("fatal error refreshing {}: {}", symbol, err);
                return Err(WatchError::Exchange {
                    symbol,
                    source: err,
                });
            }
            Err(err) => {
                debug!("{} failed this tick: {}", symbol, err);
                outcomes.push((symbol, Err(err.to_string())));
            }
        }
    }

    Ok((!limiter_cancelled).then_some(outcomes))
}
