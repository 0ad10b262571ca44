//! `setup <exchange>`: store API credentials and make the exchange default

use anyhow::{Context, bail};
use colored::Colorize;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::{self, BufRead, Write};
use termcrypto_core::Credentials;
use termcrypto_gateway::ExchangeFactory;
use tracing::info;

use super::AppContext;
use crate::config::{AppConfig, load_config, save_config};
use crate::credentials::CredentialStore;

pub fn run(ctx: &AppContext, exchange: &str) -> anyhow::Result<()> {
    let name = validate_exchange(exchange)?;

    println!("{}", format!("Setting up {}", name.to_uppercase()).bright_yellow().bold());
    println!("Leave both fields empty to use public market data only.\n");

    let api_key = prompt_line("API Key: ")?;
    let api_secret = prompt_hidden("API Secret: ")?;

    // Start from the file, not the env-overridden config in `ctx`
    let mut config = if ctx.config_path.exists() {
        load_config(&ctx.config_path)?
    } else {
        AppConfig::default()
    };

    let stored = apply(
        &mut config,
        &ctx.store,
        &name,
        Credentials::new(api_key.trim(), api_secret.trim()),
    )?;
    save_config(&ctx.config_path, &config)
        .with_context(|| format!("failed to save config to {}", ctx.config_path.display()))?;

    println!();
    if stored {
        println!("{} Credentials saved for {}", "✓".green(), name);
    } else {
        println!("{} No credentials entered; {} will use public access", "✓".green(), name);
    }
    println!("{} {} is now the default exchange\n", "✓".green(), name);
    println!("Try:");
    println!("  terminalcrypto price btc eth");
    println!("  terminalcrypto ticker btc");
    println!("  terminalcrypto watch btc eth sol");
    Ok(())
}

/// Lowercase `name` if it is a recognized exchange
pub fn validate_exchange(name: &str) -> anyhow::Result<String> {
    let name = name.trim().to_lowercase();
    if !ExchangeFactory::is_known(&name) {
        bail!(
            "unsupported exchange: {} (supported: {})",
            name,
            ExchangeFactory::known_exchanges().join(", ")
        );
    }
    Ok(name)
}

/// Store credentials (when any were entered) and make `exchange` the default
///
/// Returns whether credentials were written.
pub fn apply(
    config: &mut AppConfig,
    store: &dyn CredentialStore,
    exchange: &str,
    credentials: Credentials,
) -> anyhow::Result<bool> {
    let stored = !credentials.is_empty();
    if stored {
        store
            .set(exchange, &credentials)
            .with_context(|| format!("failed to store credentials for {}", exchange))?;
        info!("stored credentials for {}", exchange);
    }
    config.set_default_exchange(exchange);
    Ok(stored)
}

fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Leaves raw mode on every exit path
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Read a line without echoing it
fn prompt_hidden(prompt: &str) -> anyhow::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut secret = String::new();
    {
        let _raw = RawMode::enable().context("failed to read from the terminal")?;
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Enter => break,
                KeyCode::Backspace => {
                    secret.pop();
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    bail!("setup cancelled");
                }
                KeyCode::Char(c) => secret.push(c),
                KeyCode::Esc => bail!("setup cancelled"),
                _ => {}
            }
        }
    }
    println!();
    Ok(secret)
}
