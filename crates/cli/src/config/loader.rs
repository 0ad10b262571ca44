use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use super::types::AppConfig;

/// Prefix of environment variables that override file settings
pub const ENV_PREFIX: &str = "CRYPTO_";

const APP_DIR: &str = "terminalcrypto";
const CONFIG_FILE: &str = "config.json";
const MAX_DECIMAL_PLACES: u32 = 12;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("Could not determine a configuration directory")]
    NoConfigDir,
}

/// `<config_dir>/terminalcrypto`, falling back to `~/.terminalcrypto`
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    if let Some(config_dir) = dirs::config_dir() {
        return Ok(config_dir.join(APP_DIR));
    }
    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(format!(".{}", APP_DIR)));
    }
    Err(ConfigError::NoConfigDir)
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(default_config_dir()?.join(CONFIG_FILE))
}

/// Load configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Write configuration as pretty JSON, creating parent directories
pub fn save_config<P: AsRef<Path>>(path: P, config: &AppConfig) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(config)?;
    write_private(path.as_ref(), &json)?;
    Ok(())
}

/// Load the file at `path` (writing defaults there first if it does not
/// exist), then apply `CRYPTO_*` environment overrides
pub fn load_or_init<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let mut config = if path.exists() {
        load_config(path)?
    } else {
        info!("creating default config at {}", path.display());
        let config = AppConfig::default();
        save_config(path, &config)?;
        config
    };

    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    Ok(config)
}

impl AppConfig {
    /// Apply `CRYPTO_EXCHANGE` and `CRYPTO_REFRESH_INTERVAL`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(exchange) = var("EXCHANGE").filter(|v| !v.trim().is_empty()) {
            debug!("exchange overridden from environment: {}", exchange);
            self.exchange = exchange.trim().to_lowercase();
        }

        if let Some(raw) = var("REFRESH_INTERVAL") {
            self.refresh_interval =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        field: format!("{}REFRESH_INTERVAL", ENV_PREFIX),
                        reason: format!("'{}' is not a whole number of seconds", raw),
                    })?;
        }

        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval == 0 {
            return Err(ConfigError::InvalidValue {
                field: "refresh_interval".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }
        if self.display.decimal_places > MAX_DECIMAL_PLACES {
            return Err(ConfigError::InvalidValue {
                field: "display.decimal_places".to_string(),
                reason: format!("must be at most {}", MAX_DECIMAL_PLACES),
            });
        }
        if self.exchange.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "exchange".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Write `contents` readable by the owner only (Unix), creating parent
/// directories
pub(crate) fn write_private(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = open_private(path)?;
    file.write_all(contents.as_bytes())?;
    file.flush()
}

/// Open `path` for truncating writes with owner-only permissions already in
/// place, so nothing written through the handle is ever readable by others
fn open_private(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

        // `mode` only applies to newly created files
        options.mode(0o600);
        if path.exists() {
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }
    }

    options.open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.default_exchange(), "binance");
        assert_eq!(config.refresh_interval_secs(), 5);
        assert_eq!(config.display.currency, "USDT");
        assert_eq!(config.display.decimal_places, 2);
        assert!(config.exchanges.contains_key("okx"));
        assert!(!config.is_enabled("binance"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = load_config_from_str(r#"{"exchange": "coinbase"}"#).unwrap();
        assert_eq!(config.exchange, "coinbase");
        assert_eq!(config.refresh_interval, 5);
        assert_eq!(config.display.decimal_places, 2);
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = load_config_from_str(r#"{"refresh_interval": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "refresh_interval"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("CRYPTO_EXCHANGE", " Coinbase "),
            ("CRYPTO_REFRESH_INTERVAL", "15"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.exchange, "coinbase");
        assert_eq!(config.refresh_interval, 15);
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_overrides(|key| (key == "CRYPTO_REFRESH_INTERVAL").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("CRYPTO_REFRESH_INTERVAL"));
    }

    #[test]
    fn test_set_default_exchange_enables_it() {
        let mut config = AppConfig::default();
        config.set_default_exchange("COINBASE");
        assert_eq!(config.exchange, "coinbase");
        assert!(config.is_enabled("coinbase"));
        assert!(!config.is_enabled("binance"));
    }

    #[test]
    fn test_load_or_init_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = load_or_init(&path).unwrap();
        assert!(path.exists());
        assert_eq!(load_config(&path).unwrap().exchange, "binance");
        assert!(config.refresh_interval >= 1);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_private_file_is_locked_down_before_writing() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();

        // Existing world-readable file
        let existing = dir.path().join("existing.json");
        fs::write(&existing, "old contents").unwrap();
        fs::set_permissions(&existing, fs::Permissions::from_mode(0o644)).unwrap();

        let file = open_private(&existing).unwrap();
        let meta = file.metadata().unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
        assert_eq!(meta.len(), 0);
        drop(file);

        // Newly created file
        let fresh = dir.path().join("fresh.json");
        let file = open_private(&fresh).unwrap();
        assert_eq!(file.metadata().unwrap().permissions().mode() & 0o077, 0);
        drop(file);

        write_private(&existing, "secret").unwrap();
        assert_eq!(fs::read_to_string(&existing).unwrap(), "secret");
        let mode = fs::metadata(&existing).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.set_default_exchange("coinbase");
        config.display.decimal_places = 4;
        config.display.currency = "EUR".to_string();
        save_config(&path, &config).unwrap();

        assert_eq!(load_config(&path).unwrap(), config);
    }
}
