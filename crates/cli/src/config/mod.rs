pub mod loader;
pub mod types;

pub use loader::{
    ConfigError, ENV_PREFIX, default_config_dir, default_config_path, load_config,
    load_config_from_str, load_or_init, save_config,
};
pub use types::{AppConfig, DisplayConfig, ExchangeSettings};
