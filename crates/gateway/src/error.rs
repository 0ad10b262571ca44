//! Error types for the gateway crate

use thiserror::Error;

/// Failure of a single HTTP request
#[derive(Error, Debug)]
pub enum RestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API error {code} (HTTP {status}): {msg}")]
    Api { status: u16, code: i64, msg: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl RestError {
    /// HTTP status of the response, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            RestError::Http(e) => e.status().map(|s| s.as_u16()),
            RestError::Status { status, .. } | RestError::Api { status, .. } => Some(*status),
            RestError::Parse(_) => None,
        }
    }
}

/// Exchange-level errors surfaced by adapters and the factory
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("unsupported exchange: {0}")]
    UnsupportedExchange(String),

    #[error("{0} support is not implemented yet")]
    NotYetImplemented(String),

    #[error("rate limiter wait cancelled")]
    RateLimitCancelled,

    #[error("request failed after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: RestError,
    },

    #[error("no data returned for symbol: {0}")]
    NoDataForSymbol(String),

    #[error("failed to parse exchange response: {0}")]
    Parse(String),

    #[error("{operation} is not supported by {exchange}")]
    UnsupportedOperation {
        exchange: String,
        operation: &'static str,
    },

    #[error("invalid adapter configuration: {0}")]
    Configuration(String),
}

impl ExchangeError {
    /// Errors that end a live watch session instead of being shown next to
    /// one symbol
    pub fn is_fatal_for_watch(&self) -> bool {
        matches!(self, ExchangeError::Transport { .. })
    }

    /// Soft failure a caller may skip over (e.g. omit a chart)
    pub fn is_unsupported_operation(&self) -> bool {
        matches!(self, ExchangeError::UnsupportedOperation { .. })
    }
}
