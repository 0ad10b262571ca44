use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Price value - uses Decimal for precision
pub type Price = Decimal;

/// Traded volume over some window, in base-asset units
pub type Volume = Decimal;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Exchange-normalized trading pair (e.g. `BTCUSDT`, `BTC-USD`)
pub type Symbol = String;
