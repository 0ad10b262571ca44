//! Close-price mini chart, one column per candle

use colored::Colorize;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use termcrypto_core::Candle;

pub const CHART_HEIGHT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Up,
    Down,
}

/// Plot each candle's close between the lowest low and highest high
///
/// Row 0 is the top. Every column holds exactly one mark.
pub fn chart_grid(candles: &[Candle], height: usize) -> Vec<Vec<Cell>> {
    let height = height.max(1);
    let mut grid = vec![vec![Cell::Empty; candles.len()]; height];
    if candles.is_empty() {
        return grid;
    }

    let low = candles.iter().map(|c| c.low).min().unwrap_or_default();
    let high = candles.iter().map(|c| c.high).max().unwrap_or_default();
    let range = high
        .checked_sub(low)
        .filter(|r| *r > Decimal::ZERO)
        .unwrap_or(Decimal::ONE);

    let top = height - 1;
    let steps = Decimal::from(top as u64);
    for (x, candle) in candles.iter().enumerate() {
        let level = candle
            .close
            .checked_sub(low)
            .and_then(|d| d.checked_div(range))
            .and_then(|d| d.checked_mul(steps))
            .and_then(|d| d.floor().to_usize())
            .unwrap_or(0)
            .min(top);
        grid[top - level][x] = if candle.is_bullish() {
            Cell::Up
        } else {
            Cell::Down
        };
    }
    grid
}

/// Colored chart lines: green `█` for up candles, red `▄` for down
pub fn render_mini_chart(candles: &[Candle], height: usize) -> Vec<String> {
    chart_grid(candles, height)
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| match cell {
                    Cell::Empty => " ".to_string(),
                    Cell::Up => "█".green().to_string(),
                    Cell::Down => "▄".red().to_string(),
                })
                .collect()
        })
        .collect()
}
