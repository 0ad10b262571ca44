use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::{Price, Symbol, Timestamp, Volume};

/// Point-in-time 24h market statistics for one trading pair
///
/// `symbol` is always in the issuing exchange's normalized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: Symbol,
    pub price: Price,
    /// Absolute price change over the last 24h
    pub change_24h: Decimal,
    pub volume_24h: Volume,
    pub high_24h: Price,
    pub low_24h: Price,
    pub last_updated: Timestamp,
    /// Set when the exchange has no real 24h statistics and high/low/change/volume
    /// were filled in from the spot price. Renderers must label such tickers.
    #[serde(default)]
    pub approximate: bool,
}

impl Ticker {
    /// 24h change as a percentage of the price 24h ago
    ///
    /// Returns `None` when the implied opening price is zero or the result
    /// does not fit in a `Decimal`.
    pub fn change_percent(&self) -> Option<Decimal> {
        let open = self.price.checked_sub(self.change_24h)?;
        if open.is_zero() {
            return None;
        }
        self.change_24h
            .checked_div(open)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }

    /// High/low spread as a percentage of the low
    pub fn amplitude_percent(&self) -> Option<Decimal> {
        if self.low_24h <= Decimal::ZERO {
            return None;
        }
        self.high_24h
            .checked_sub(self.low_24h)?
            .checked_div(self.low_24h)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }

    pub fn is_gaining(&self) -> bool {
        self.change_24h >= Decimal::ZERO
    }
}
