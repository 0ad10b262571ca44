use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "terminalcrypto", version)]
#[command(about = "Cryptocurrency prices in the terminal", long_about = None)]
pub struct Cli {
    /// Exchange to query (binance, coinbase); defaults to the configured one
    #[arg(short, long, global = true)]
    pub exchange: Option<String>,

    /// Config file path
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Current price of one or more symbols
    Price {
        #[arg(required = true, value_name = "SYMBOL")]
        symbols: Vec<String>,
    },
    /// 24h statistics of one or more symbols
    Ticker {
        #[arg(required = true, value_name = "SYMBOL")]
        symbols: Vec<String>,
    },
    /// Live-updating price board
    Watch {
        #[arg(required = true, value_name = "SYMBOL")]
        symbols: Vec<String>,

        /// Refresh interval in seconds
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,

        /// Stop after this many refreshes
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        iterations: Option<u64>,
    },
    /// Price card with 24h stats and a mini chart
    Quote {
        #[arg(value_name = "SYMBOL")]
        symbol: String,
    },
    /// Store API credentials and make an exchange the default
    Setup {
        #[arg(value_name = "EXCHANGE")]
        exchange: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_exchange_flag() {
        let cli = Cli::try_parse_from(["terminalcrypto", "price", "btc", "eth", "-e", "coinbase"])
            .unwrap();
        assert_eq!(cli.exchange.as_deref(), Some("coinbase"));
        match cli.command {
            Commands::Price { symbols } => assert_eq!(symbols, vec!["btc", "eth"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_watch_options() {
        let cli = Cli::try_parse_from([
            "terminalcrypto",
            "--config",
            "/tmp/c.json",
            "watch",
            "btc",
            "--interval",
            "10",
            "--iterations",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
        match cli.command {
            Commands::Watch {
                symbols,
                interval,
                iterations,
            } => {
                assert_eq!(symbols, vec!["btc"]);
                assert_eq!(interval, Some(10));
                assert_eq!(iterations, Some(3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Cli::try_parse_from(["terminalcrypto", "price"]).is_err());
        assert!(Cli::try_parse_from(["terminalcrypto", "watch", "btc", "-i", "0"]).is_err());
        assert!(Cli::try_parse_from(["terminalcrypto", "setup"]).is_err());
    }
}
