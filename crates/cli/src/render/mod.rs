//! Styled text output
//!
//! Every function here builds a `String`; writing it out is left to the
//! caller. Colors come from `colored` and are dropped automatically when
//! stdout is not a terminal or `NO_COLOR` is set.

pub mod chart;
pub mod format;
pub mod terminal;

use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};
use termcrypto_core::{Candle, Direction, Price, Ticker};
use termcrypto_runner::{PriceBoard, Quote};

pub use chart::{CHART_HEIGHT, render_mini_chart};
pub use format::{format_change, format_percent, format_price, format_volume};
pub use terminal::{BoardView, TerminalBoard, spawn_quit_listener};

const RULE_WIDTH: usize = 50;
const WIDE_RULE_WIDTH: usize = 60;
const SYMBOL_COLUMN: usize = 15;

fn header(text: &str) -> ColoredString {
    text.bright_yellow().bold()
}

fn symbol(text: &str) -> ColoredString {
    text.bright_cyan().bold()
}

fn label(text: &str) -> ColoredString {
    text.bright_black()
}

fn value(text: &str) -> ColoredString {
    text.white().bold()
}

fn error(text: &str) -> ColoredString {
    text.bright_red()
}

fn gain(text: &str, gaining: bool) -> ColoredString {
    if gaining {
        text.bright_green()
    } else {
        text.bright_red()
    }
}

/// `price` command output
pub fn price_report(
    exchange: &str,
    rows: &[(String, Result<Price, String>)],
    decimals: u32,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n",
        header(&format!("Prices from {}:", exchange.to_uppercase()))
    ));
    out.push_str(&"─".repeat(RULE_WIDTH));
    out.push('\n');

    for (sym, result) in rows {
        match result {
            Ok(price) => out.push_str(&format!(
                "{}: {}\n",
                symbol(sym),
                gain(&format_price(*price, decimals), true).bold()
            )),
            Err(e) => out.push_str(&format!(
                "{}: {}\n",
                symbol(sym),
                error(&format!("Error: {}", e))
            )),
        }
    }
    out
}

/// `ticker` command output
pub fn ticker_report(
    exchange: &str,
    rows: &[(String, Result<Ticker, String>)],
    decimals: u32,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n",
        header(&format!("24h Market Data from {}:", exchange.to_uppercase()))
    ));
    out.push_str(&"═".repeat(WIDE_RULE_WIDTH));
    out.push('\n');

    for (i, (sym, result)) in rows.iter().enumerate() {
        if i > 0 {
            out.push_str(&"─".repeat(WIDE_RULE_WIDTH));
            out.push('\n');
        }
        match result {
            Ok(ticker) => out.push_str(&ticker_block(ticker, decimals)),
            Err(e) => out.push_str(&format!("{}: {}\n", symbol(sym), error(&format!("Error: {}", e)))),
        }
    }

    out.push_str(&"═".repeat(WIDE_RULE_WIDTH));
    out.push('\n');
    out
}

fn ticker_block(ticker: &Ticker, decimals: u32) -> String {
    let mut out = String::new();
    let title = if ticker.approximate {
        format!("{} {}", symbol(&ticker.symbol), label("(approximate)"))
    } else {
        symbol(&ticker.symbol).to_string()
    };
    out.push_str(&title);
    out.push('\n');

    let row = |name: &str, v: String| format!("  {}  {}\n", label(&format!("{:<11}", name)), v);

    out.push_str(&row("Price:", value(&format_price(ticker.price, decimals)).to_string()));
    if ticker.approximate {
        out.push_str(&row("24h Change:", label("n/a").to_string()));
    } else {
        let change = format_change(ticker.change_24h, ticker.change_percent(), decimals);
        out.push_str(&row("24h Change:", gain(&change, ticker.is_gaining()).to_string()));
    }
    out.push_str(&row("24h High:", value(&format_price(ticker.high_24h, decimals)).to_string()));
    out.push_str(&row("24h Low:", value(&format_price(ticker.low_24h, decimals)).to_string()));
    if ticker.approximate {
        out.push_str(&row("24h Volume:", label("n/a").to_string()));
    } else {
        out.push_str(&row("24h Volume:", value(&format_volume(ticker.volume_24h)).to_string()));
    }
    out
}

/// `quote` command card: price, 24h stats and an optional mini chart
pub fn quote_card(
    ticker: &Ticker,
    candles: Option<&[Candle]>,
    exchange: &str,
    decimals: u32,
    at: DateTime<Local>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n\n",
        header(&format!(" {} Live Quote ", ticker.symbol)).on_black()
    ));

    out.push_str(&format!("{}\n", symbol(&ticker.symbol)));
    out.push_str(&value(&format_price(ticker.price, decimals)).to_string());
    if !ticker.approximate {
        let arrow = if ticker.is_gaining() { "▲" } else { "▼" };
        let change = format_change(ticker.change_24h, ticker.change_percent(), decimals);
        out.push_str(&format!(
            "  {}",
            gain(&format!("{} {}", arrow, change), ticker.is_gaining()).bold()
        ));
    }
    out.push_str("\n\n");

    out.push_str(&format!("{}\n", label("━━━ 24h ━━━")));
    out.push_str(&format!(
        "{} {}  {} {}\n",
        label("High:"),
        value(&format_price(ticker.high_24h, decimals)),
        label("Low:"),
        value(&format_price(ticker.low_24h, decimals))
    ));
    if let Some(amplitude) = ticker.amplitude_percent() {
        out.push_str(&format!(
            "{} {}\n",
            label("Amplitude:"),
            value(&format_percent(amplitude))
        ));
    }
    if ticker.volume_24h > rust_decimal::Decimal::ZERO {
        out.push_str(&format!(
            "{} {}\n",
            label("Volume:"),
            value(&format_volume(ticker.volume_24h))
        ));
    }
    if ticker.approximate {
        out.push_str(&format!(
            "{}\n",
            label("High/low are approximated from the spot price; this exchange reports no 24h statistics")
        ));
    }

    if let Some(candles) = candles.filter(|c| !c.is_empty()) {
        out.push('\n');
        out.push_str(&format!("{}\n", label("━━━ 24h trend ━━━")));
        for line in render_mini_chart(candles, CHART_HEIGHT) {
            out.push_str(&line);
            out.push('\n');
        }
    }

    out.push('\n');
    out.push_str(&format!(
        "{}\n",
        label(&format!(
            "Source: {} | {}",
            exchange.to_uppercase(),
            at.format("%Y-%m-%d %H:%M:%S")
        ))
    ));
    out
}

/// One frame of the live watch board
pub fn board_frame(board: &PriceBoard, exchange: &str, interval_secs: u64, decimals: u32) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}  {}\n",
        header(&format!(" Real-time Prices ({}) ", exchange.to_uppercase())),
        label(&format!(
            "tick {} · {}",
            board.tick,
            board.updated_at.with_timezone(&Local).format("%H:%M:%S")
        ))
    ));
    out.push_str(&"═".repeat(RULE_WIDTH));
    out.push_str("\n\n");

    for entry in &board.entries {
        let name = symbol(&format!("{:<width$}", entry.symbol, width = SYMBOL_COLUMN));
        match &entry.quote {
            Quote::Price(sample) => {
                let direction = sample.direction();
                let price = format_price(sample.price, decimals);
                let styled = match direction {
                    Direction::Up => price.bright_green().bold(),
                    Direction::Down => price.bright_red().bold(),
                    Direction::Flat => price.white().bold(),
                };
                out.push_str(&format!("{} {} {}\n", name, styled, direction.arrow()));
            }
            Quote::Failed { error: e, last } => {
                let mut line = format!("Error: {}", e);
                if let Some(last) = last {
                    line.push_str(&format!(" (last {})", format_price(last.price, decimals)));
                }
                out.push_str(&format!("{} {}\n", name, error(&line)));
            }
        }
    }

    out.push('\n');
    out.push_str(&"═".repeat(RULE_WIDTH));
    out.push('\n');
    out.push_str(&format!(
        "{}\n",
        label(&format!(
            "Refreshing every {} seconds • Press 'q' to quit",
            interval_secs
        ))
        .italic()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use termcrypto_core::PriceSample;
    use termcrypto_runner::BoardEntry;

    fn plain() {
        colored::control::set_override(false);
    }

    fn ticker(approximate: bool) -> Ticker {
        Ticker {
            symbol: "BTCUSDT".to_string(),
            price: dec!(50000),
            change_24h: dec!(1000),
            volume_24h: dec!(12345.678),
            high_24h: dec!(51000),
            low_24h: dec!(48000),
            last_updated: Utc::now(),
            approximate,
        }
    }

    #[test]
    fn test_price_report_inline_errors() {
        plain();
        let rows = vec![
            ("BTCUSDT".to_string(), Ok(dec!(50000.5))),
            ("INVALIDXYZ".to_string(), Err("no data returned for symbol: INVALIDXYZ".to_string())),
        ];
        let out = price_report("binance", &rows, 2);
        assert!(out.starts_with("Prices from BINANCE:"));
        assert!(out.contains("BTCUSDT: $50000.50"));
        assert!(out.contains("INVALIDXYZ: Error: no data returned for symbol: INVALIDXYZ"));
    }

    #[test]
    fn test_ticker_report() {
        plain();
        let rows = vec![("btc".to_string(), Ok(ticker(false)))];
        let out = ticker_report("binance", &rows, 2);
        assert!(out.contains("24h Change:  +$1000.00 (+2.04%)"));
        assert!(out.contains("24h Volume:  12.35K"));
        assert!(!out.contains("approximate"));
    }

    #[test]
    fn test_approximate_ticker_is_labelled() {
        plain();
        let rows = vec![("btc".to_string(), Ok(ticker(true)))];
        let out = ticker_report("coinbase", &rows, 2);
        assert!(out.contains("BTCUSDT (approximate)"));
        assert!(out.contains("24h Change:  n/a"));
    }

    #[test]
    fn test_quote_card() {
        plain();
        let at = Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let candles = vec![Candle {
            time: Utc::now(),
            open: dec!(100),
            high: dec!(110),
            low: dec!(90),
            close: dec!(105),
            volume: dec!(1),
        }];

        let out = quote_card(&ticker(false), Some(&candles), "binance", 2, at);
        assert!(out.contains("BTCUSDT Live Quote"));
        assert!(out.contains("▲ +$1000.00 (+2.04%)"));
        assert!(out.contains("Amplitude: 6.25%"));
        assert!(out.contains("24h trend"));
        assert!(out.contains("Source: BINANCE | 2024-03-01 12:30:00"));

        let no_chart = quote_card(&ticker(false), None, "binance", 2, at);
        assert!(!no_chart.contains("24h trend"));
    }

    #[test]
    fn test_board_frame() {
        plain();
        let now = Utc::now();
        let prior = PriceSample::first("BTCUSDT", dec!(100), now);
        let board = PriceBoard {
            tick: 2,
            updated_at: now,
            entries: vec![
                BoardEntry {
                    symbol: "BTCUSDT".to_string(),
                    quote: Quote::Price(prior.next(dec!(105), now)),
                },
                BoardEntry {
                    symbol: "ETHUSDT".to_string(),
                    quote: Quote::Failed {
                        error: "timeout".to_string(),
                        last: Some(PriceSample::first("ETHUSDT", dec!(3000), now)),
                    },
                },
            ],
        };

        let out = board_frame(&board, "binance", 5, 2);
        assert!(out.contains("Real-time Prices (BINANCE)"));
        assert!(out.contains("tick 2"));
        assert!(out.contains("$105.00 ↑"));
        assert!(out.contains("Error: timeout (last $3000.00)"));
        assert!(out.contains("Refreshing every 5 seconds"));
    }
}
