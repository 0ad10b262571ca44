use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use termcrypto_gateway::ExchangeFactory;

/// Root configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Exchange used when `--exchange` is not given
    #[serde(default = "default_exchange")]
    pub exchange: String,
    /// Watch refresh interval in seconds
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
    /// Per-exchange settings, keyed by lowercase exchange name
    #[serde(default = "default_exchanges")]
    pub exchanges: BTreeMap<String, ExchangeSettings>,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeSettings {
    #[serde(default)]
    pub enabled: bool,
}

/// Output formatting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Preferred quote currency. Not read by any command yet; kept so
    /// existing config files round-trip unchanged.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Decimals for prices of 100 and above; smaller prices get more
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            exchange: default_exchange(),
            refresh_interval: default_refresh_interval(),
            exchanges: default_exchanges(),
            display: DisplayConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            currency: default_currency(),
            decimal_places: default_decimal_places(),
        }
    }
}

impl AppConfig {
    pub fn default_exchange(&self) -> &str {
        &self.exchange
    }

    pub fn refresh_interval_secs(&self) -> u64 {
        self.refresh_interval
    }

    /// Make `name` the default exchange and mark it enabled
    pub fn set_default_exchange(&mut self, name: &str) {
        let name = name.trim().to_lowercase();
        self.exchanges.entry(name.clone()).or_default().enabled = true;
        self.exchange = name;
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.exchanges
            .get(&name.to_lowercase())
            .is_some_and(|e| e.enabled)
    }
}

// Default value functions for serde
fn default_exchange() -> String {
    "binance".to_string()
}

fn default_refresh_interval() -> u64 {
    5
}

fn default_exchanges() -> BTreeMap<String, ExchangeSettings> {
    ExchangeFactory::known_exchanges()
        .into_iter()
        .map(|name| (name.to_string(), ExchangeSettings::default()))
        .collect()
}

fn default_currency() -> String {
    "USDT".to_string()
}

fn default_decimal_places() -> u32 {
    2
}
