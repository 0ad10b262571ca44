//! terminalcrypto - cryptocurrency prices in the terminal
//!
//! Command-line front end over the exchange gateway and refresh loop:
//!
//! - **config**: JSON settings file with `CRYPTO_*` environment overrides
//! - **credentials**: per-exchange API key store
//! - **logging**: stderr tracing output, held back while the watch board is up
//! - **render**: styled reports, quote cards and the live watch board
//! - **commands**: `price`, `ticker`, `quote`, `watch`, `setup`

pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod logging;
pub mod render;

pub use cli::{Cli, Commands};
pub use commands::{AppContext, run};
