use serde::{Deserialize, Serialize};

use crate::values::{Price, Symbol, Timestamp};

/// Price movement relative to the previous sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Up => "↑",
            Direction::Down => "↓",
            Direction::Flat => "─",
        }
    }
}

/// One observed price for a watched symbol, remembering the price seen on
/// the previous refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub symbol: Symbol,
    pub price: Price,
    pub previous_price: Option<Price>,
    pub timestamp: Timestamp,
}

impl PriceSample {
    /// First observation of a symbol
    pub fn first(symbol: impl Into<Symbol>, price: Price, timestamp: Timestamp) -> Self {
        PriceSample {
            symbol: symbol.into(),
            price,
            previous_price: None,
            timestamp,
        }
    }

    /// Next observation, carrying forward the price of `self`
    pub fn next(&self, price: Price, timestamp: Timestamp) -> Self {
        PriceSample {
            symbol: self.symbol.clone(),
            price,
            previous_price: Some(self.price),
            timestamp,
        }
    }

    /// Build a sample from an optional prior one
    pub fn observe(
        prior: Option<&PriceSample>,
        symbol: impl Into<Symbol>,
        price: Price,
        timestamp: Timestamp,
    ) -> Self {
        match prior {
            Some(prev) => prev.next(price, timestamp),
            None => PriceSample::first(symbol, price, timestamp),
        }
    }

    pub fn direction(&self) -> Direction {
        match self.previous_price {
            Some(prev) if self.price > prev => Direction::Up,
            Some(prev) if self.price < prev => Direction::Down,
            _ => Direction::Flat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_first_sample_is_flat() {
        let sample = PriceSample::first("BTCUSDT", dec!(100), Utc::now());
        assert_eq!(sample.previous_price, None);
        assert_eq!(sample.direction(), Direction::Flat);
    }

    #[test]
    fn test_direction_up_down_flat() {
        let first = PriceSample::first("BTCUSDT", dec!(100), Utc::now());

        let up = first.next(dec!(105), Utc::now());
        assert_eq!(up.previous_price, Some(dec!(100)));
        assert_eq!(up.price, dec!(105));
        assert_eq!(up.direction(), Direction::Up);

        let flat = up.next(dec!(105), Utc::now());
        assert_eq!(flat.direction(), Direction::Flat);

        let down = flat.next(dec!(99.5), Utc::now());
        assert_eq!(down.direction(), Direction::Down);
    }

    #[test]
    fn test_observe_uses_prior() {
        let prior = PriceSample::first("ETHUSDT", dec!(3000), Utc::now());
        let sample = PriceSample::observe(Some(&prior), "ETHUSDT", dec!(2990), Utc::now());
        assert_eq!(sample.previous_price, Some(dec!(3000)));
        assert_eq!(sample.direction(), Direction::Down);

        let fresh = PriceSample::observe(None, "ETHUSDT", dec!(2990), Utc::now());
        assert_eq!(fresh.previous_price, None);
    }
}
