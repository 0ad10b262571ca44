//! Name-keyed adapter construction

use termcrypto_core::Credentials;
use tracing::debug;

use crate::adapters::{BinanceAdapter, CoinbaseAdapter, Exchange};
use crate::config::AdapterOptions;
use crate::error::ExchangeError;

type Constructor = fn(&Credentials, AdapterOptions) -> Result<Box<dyn Exchange>, ExchangeError>;

struct RegistryEntry {
    name: &'static str,
    /// `None` for exchanges that are recognized but have no adapter yet
    constructor: Option<Constructor>,
}

const REGISTRY: &[RegistryEntry] = &[
    RegistryEntry {
        name: "binance",
        constructor: Some(binance),
    },
    RegistryEntry {
        name: "coinbase",
        constructor: Some(coinbase),
    },
    RegistryEntry {
        name: "okx",
        constructor: None,
    },
];

fn binance(creds: &Credentials, options: AdapterOptions) -> Result<Box<dyn Exchange>, ExchangeError> {
    Ok(Box::new(BinanceAdapter::new(creds, options)?))
}

fn coinbase(creds: &Credentials, options: AdapterOptions) -> Result<Box<dyn Exchange>, ExchangeError> {
    Ok(Box::new(CoinbaseAdapter::new(creds, options)?))
}

/// Builds exchange adapters by name
///
/// Names are matched case-insensitively. Empty credentials are valid and
/// give public access.
pub struct ExchangeFactory;

impl ExchangeFactory {
    /// Adapter with default options
    pub fn create(
        name: &str,
        api_key: &str,
        api_secret: &str,
    ) -> Result<Box<dyn Exchange>, ExchangeError> {
        Self::create_with(
            name,
            &Credentials::new(api_key, api_secret),
            AdapterOptions::default(),
        )
    }

    pub fn create_with(
        name: &str,
        credentials: &Credentials,
        options: AdapterOptions,
    ) -> Result<Box<dyn Exchange>, ExchangeError> {
        let key = name.trim().to_lowercase();
        let entry = REGISTRY
            .iter()
            .find(|e| e.name == key)
            .ok_or_else(|| ExchangeError::UnsupportedExchange(name.to_string()))?;

        let constructor = entry
            .constructor
            .ok_or_else(|| ExchangeError::NotYetImplemented(entry.name.to_string()))?;

        debug!("creating {} adapter", entry.name);
        constructor(credentials, options)
    }

    /// Exchanges with a working adapter
    pub fn supported_exchanges() -> Vec<&'static str> {
        REGISTRY
            .iter()
            .filter(|e| e.constructor.is_some())
            .map(|e| e.name)
            .collect()
    }

    /// Every recognized exchange name, including ones without an adapter
    pub fn known_exchanges() -> Vec<&'static str> {
        REGISTRY.iter().map(|e| e.name).collect()
    }

    pub fn is_known(name: &str) -> bool {
        let key = name.trim().to_lowercase();
        REGISTRY.iter().any(|e| e.name == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_known_adapters() {
        let binance = ExchangeFactory::create("binance", "", "").unwrap();
        assert_eq!(binance.name(), "binance");

        let coinbase = ExchangeFactory::create("Coinbase", "key", "secret").unwrap();
        assert_eq!(coinbase.name(), "coinbase");
    }

    #[test]
    fn test_unknown_exchange() {
        let err = ExchangeFactory::create("kraken", "", "").err().unwrap();
        assert!(matches!(err, ExchangeError::UnsupportedExchange(ref n) if n == "kraken"));
    }

    #[test]
    fn test_recognized_but_not_implemented() {
        let err = ExchangeFactory::create("okx", "", "").err().unwrap();
        assert!(matches!(err, ExchangeError::NotYetImplemented(ref n) if n == "okx"));
    }

    #[test]
    fn test_registry_listing() {
        assert_eq!(ExchangeFactory::supported_exchanges(), vec!["binance", "coinbase"]);
        assert_eq!(
            ExchangeFactory::known_exchanges(),
            vec!["binance", "coinbase", "okx"]
        );
        assert!(ExchangeFactory::is_known(" OKX "));
        assert!(!ExchangeFactory::is_known("kraken"));
    }

    #[test]
    fn test_adapter_normalization_is_per_exchange() {
        let binance = ExchangeFactory::create("binance", "", "").unwrap();
        let coinbase = ExchangeFactory::create("coinbase", "", "").unwrap();
        assert_eq!(binance.normalize_symbol("btc"), "BTCUSDT");
        assert_eq!(coinbase.normalize_symbol("btc"), "BTC-USD");
    }
}
