//! Command handlers
//!
//! Handlers that print take an `&dyn Exchange` and an output writer so they
//! can run against a fake exchange in tests.

pub mod price;
pub mod quote;
pub mod setup;
pub mod ticker;
pub mod watch;

use anyhow::Context;
use std::io;
use std::path::{Path, PathBuf};
use termcrypto_gateway::{AdapterOptions, Exchange, ExchangeFactory};
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::config::{AppConfig, default_config_path, load_or_init};
use crate::credentials::{FileCredentialStore, resolve_credentials};

/// Everything a command needs from the environment
pub struct AppContext {
    pub config: AppConfig,
    pub config_path: PathBuf,
    /// Lowercase exchange name, from `--exchange` or the config default
    pub exchange_name: String,
    pub store: FileCredentialStore,
}

impl AppContext {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let config_path = match &cli.config {
            Some(path) => path.clone(),
            None => default_config_path()?,
        };
        let config = load_or_init(&config_path)
            .with_context(|| format!("failed to load config from {}", config_path.display()))?;

        Ok(AppContext::new(config, config_path, cli.exchange.as_deref()))
    }

    /// Context with the credential store kept next to the config file
    pub fn new(config: AppConfig, config_path: PathBuf, exchange: Option<&str>) -> Self {
        let exchange_name = exchange
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| config.default_exchange().to_string());
        let store = FileCredentialStore::in_dir(config_path.parent().unwrap_or(Path::new(".")));

        AppContext {
            config,
            config_path,
            exchange_name,
            store,
        }
    }

    pub fn decimals(&self) -> u32 {
        self.config.display.decimal_places
    }

    /// Adapter for the selected exchange, using stored credentials when present
    pub fn exchange(&self, options: AdapterOptions) -> anyhow::Result<Box<dyn Exchange>> {
        let credentials = resolve_credentials(&self.store, &self.exchange_name);
        debug!(
            exchange = %self.exchange_name,
            authenticated = !credentials.is_empty(),
            "resolving exchange adapter"
        );
        Ok(ExchangeFactory::create_with(
            &self.exchange_name,
            &credentials,
            options,
        )?)
    }
}

/// Dispatch a parsed command line
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = AppContext::load(&cli)?;
    let mut stdout = io::stdout();

    match cli.command {
        Commands::Price { symbols } => {
            let exchange = ctx.exchange(AdapterOptions::default())?;
            price::run(exchange.as_ref(), &symbols, ctx.decimals(), &mut stdout).await
        }
        Commands::Ticker { symbols } => {
            let exchange = ctx.exchange(AdapterOptions::default())?;
            ticker::run(exchange.as_ref(), &symbols, ctx.decimals(), &mut stdout).await
        }
        Commands::Quote { symbol } => {
            let exchange = ctx.exchange(AdapterOptions::default())?;
            quote::run(exchange.as_ref(), &symbol, ctx.decimals(), &mut stdout).await
        }
        Commands::Watch {
            symbols,
            interval,
            iterations,
        } => watch::run(&ctx, symbols, interval, iterations).await,
        Commands::Setup { exchange } => setup::run(&ctx, &exchange),
    }
}
