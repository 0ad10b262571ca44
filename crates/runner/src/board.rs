//! Per-symbol watch state and the snapshots handed to renderers

use std::collections::{HashMap, HashSet};
use termcrypto_core::{Price, PriceSample, Symbol, Timestamp};

/// Latest outcome for one watched symbol
#[derive(Debug, Clone, PartialEq)]
pub enum Quote {
    Price(PriceSample),
    /// This tick's fetch failed. `last` is the most recent good sample, if
    /// any, and stays the baseline for the next direction.
    Failed {
        error: String,
        last: Option<PriceSample>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardEntry {
    pub symbol: Symbol,
    pub quote: Quote,
}

/// Immutable snapshot published once per completed tick
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBoard {
    /// 1-based tick number
    pub tick: u64,
    pub updated_at: Timestamp,
    /// Entries in watch order
    pub entries: Vec<BoardEntry>,
}

impl PriceBoard {
    pub fn get(&self, symbol: &str) -> Option<&BoardEntry> {
        self.entries.iter().find(|e| e.symbol == symbol)
    }

    /// Successful samples of this tick keyed by symbol
    pub fn samples(&self) -> HashMap<Symbol, PriceSample> {
        self.entries
            .iter()
            .filter_map(|e| match &e.quote {
                Quote::Price(sample) => Some((e.symbol.clone(), sample.clone())),
                Quote::Failed { .. } => None,
            })
            .collect()
    }

    pub fn failures(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.quote, Quote::Failed { .. }))
            .count()
    }
}

/// Mutable watch state, owned exclusively by the refresh loop
#[derive(Debug)]
pub struct WatchBoard {
    symbols: Vec<Symbol>,
    samples: HashMap<Symbol, PriceSample>,
    tick: u64,
}

impl WatchBoard {
    /// `symbols` must already be normalized; duplicates keep their first
    /// position
    pub fn new(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        let mut seen = HashSet::new();
        let symbols = symbols
            .into_iter()
            .filter(|s| seen.insert(s.clone()))
            .collect();

        WatchBoard {
            symbols,
            samples: HashMap::new(),
            tick: 0,
        }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn sample(&self, symbol: &str) -> Option<&PriceSample> {
        self.samples.get(symbol)
    }

    /// Fold one tick's results into the state and return the snapshot
    ///
    /// Each successful price becomes a new sample whose `previous_price` is
    /// the last stored price for that symbol. Failed symbols keep their
    /// stored sample untouched.
    pub fn apply(
        &mut self,
        results: Vec<(Symbol, Result<Price, String>)>,
        at: Timestamp,
    ) -> PriceBoard {
        let mut results: HashMap<Symbol, Result<Price, String>> = results.into_iter().collect();
        self.tick += 1;

        let mut entries = Vec::with_capacity(self.symbols.len());
        for symbol in &self.symbols {
            let quote = match results.remove(symbol) {
                Some(Ok(price)) => {
                    let sample = PriceSample::observe(self.samples.get(symbol), symbol.clone(), price, at);
                    self.samples.insert(symbol.clone(), sample.clone());
                    Quote::Price(sample)
                }
                Some(Err(error)) => Quote::Failed {
                    error,
                    last: self.samples.get(symbol).cloned(),
                },
                None => Quote::Failed {
                    error: "no result".to_string(),
                    last: self.samples.get(symbol).cloned(),
                },
            };
            entries.push(BoardEntry {
                symbol: symbol.clone(),
                quote,
            });
        }

        PriceBoard {
            tick: self.tick,
            updated_at: at,
            entries,
        }
    }
}
