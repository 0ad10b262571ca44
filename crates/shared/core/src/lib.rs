//! terminalcrypto Core Domain
//!
//! Pure market data types shared by the exchange gateway, the refresh loop
//! and the terminal renderers.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{Candle, CandleInterval, Credentials, Direction, PriceSample, Ticker};
pub use values::{Price, Symbol, Timestamp, Volume};
