//! Currency and asset symbols, and the configured symbol universe.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{RatefeedError, Result};

/// A currency or asset code (e.g. `BRL`, `BTC`), always upper-case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new symbol from a code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    /// Get the symbol code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// The US dollar, base of every rate mapping.
    pub fn usd() -> Self {
        Self::new("USD")
    }

    /// Check if this is the US dollar.
    pub fn is_usd(&self) -> bool {
        self.0 == "USD"
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// How a symbol is quoted against USD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Government-issued currency, quoted as `USD-XXX`.
    Fiat,
    /// Crypto, metal or commodity, quoted as `XXX-USD`.
    Asset,
}

/// The configured symbol universe: two disjoint sets, fiat and asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSet {
    fiat: BTreeSet<Symbol>,
    asset: BTreeSet<Symbol>,
}

impl SymbolSet {
    /// Build a symbol set, rejecting overlap between fiat and asset symbols.
    pub fn new(
        fiat: impl IntoIterator<Item = Symbol>,
        asset: impl IntoIterator<Item = Symbol>,
    ) -> Result<Self> {
        let fiat: BTreeSet<Symbol> = fiat.into_iter().filter(|s| !s.is_usd()).collect();
        let asset: BTreeSet<Symbol> = asset.into_iter().filter(|s| !s.is_usd()).collect();

        if let Some(shared) = fiat.intersection(&asset).next() {
            return Err(RatefeedError::InvalidSymbolSet(format!(
                "{} is configured as both fiat and asset",
                shared
            )));
        }

        Ok(Self { fiat, asset })
    }

    /// Parse a comma-separated symbol list such as `"BRL, eur,GBP"`.
    pub fn parse_list(list: &str) -> Vec<Symbol> {
        list.split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(Symbol::new)
            .collect()
    }

    /// Fiat symbols in code order.
    pub fn fiat(&self) -> impl Iterator<Item = &Symbol> {
        self.fiat.iter()
    }

    /// Asset symbols in code order.
    pub fn assets(&self) -> impl Iterator<Item = &Symbol> {
        self.asset.iter()
    }

    /// Classify a symbol, if it belongs to the universe.
    pub fn kind_of(&self, symbol: &Symbol) -> Option<SymbolKind> {
        if self.fiat.contains(symbol) {
            Some(SymbolKind::Fiat)
        } else if self.asset.contains(symbol) {
            Some(SymbolKind::Asset)
        } else {
            None
        }
    }

    /// Check membership in either set.
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.kind_of(symbol).is_some()
    }

    /// Total number of configured symbols.
    pub fn len(&self) -> usize {
        self.fiat.len() + self.asset.len()
    }

    /// Check if no symbols are configured.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SymbolSet {
    fn default() -> Self {
        Self {
            fiat: SymbolSet::parse_list("BRL,EUR,GBP,JPY,CAD,AUD,CHF,CNY,ARS,MXN")
                .into_iter()
                .collect(),
            asset: SymbolSet::parse_list("BTC,ETH,LTC,XRP").into_iter().collect(),
        }
    }
}
