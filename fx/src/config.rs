//! Provider chain configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use ratefeed_common::{Symbol, SymbolSet};

use crate::error::FxError;

/// Upstream provider variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Direct currency pairs (`USD-BRL`, `BTC-USD`), token in the query string.
    Pairs,
    /// Flat list of USD-based rates, bearer token.
    Flat,
}

impl ProviderKind {
    /// Provider name used in logs and for credential lookup.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Pairs => "pairs",
            ProviderKind::Flat => "flat",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pairs" => Ok(ProviderKind::Pairs),
            "flat" => Ok(ProviderKind::Flat),
            other => Err(FxError::InvalidConfig(format!("unknown provider '{}'", other))),
        }
    }
}

/// Configuration for the provider chain. Built once at startup.
#[derive(Debug, Clone)]
pub struct FxConfig {
    /// Symbols requested from every provider.
    pub symbols: SymbolSet,
    /// Providers in priority order, primary first.
    pub providers: Vec<ProviderKind>,
    /// Base URL of the direct-pair provider.
    pub pairs_url: String,
    /// Base URL of the flat-list provider.
    pub flat_url: String,
    /// Per-provider request timeout. `None` leaves the transport default.
    pub request_timeout: Option<Duration>,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            symbols: SymbolSet::default(),
            providers: vec![ProviderKind::Pairs, ProviderKind::Flat],
            pairs_url: "https://economia.awesomeapi.com.br".to_string(),
            flat_url: "https://api.wise.com".to_string(),
            request_timeout: Some(Duration::from_secs(10)),
        }
    }
}

impl FxConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, FxError> {
        let mut config = Self::default();

        let fiat = std::env::var("RATEFEED_FIAT_SYMBOLS").ok();
        let asset = std::env::var("RATEFEED_ASSET_SYMBOLS").ok();
        if fiat.is_some() || asset.is_some() {
            let fiat = fiat
                .map(|list| SymbolSet::parse_list(&list))
                .unwrap_or_else(|| config.symbols.fiat().cloned().collect());
            let asset = asset
                .map(|list| SymbolSet::parse_list(&list))
                .unwrap_or_else(|| config.symbols.assets().cloned().collect::<Vec<Symbol>>());
            config.symbols = SymbolSet::new(fiat, asset)
                .map_err(|e| FxError::InvalidConfig(e.to_string()))?;
        }

        if let Ok(order) = std::env::var("RATEFEED_PROVIDERS") {
            config.providers = order
                .split(',')
                .filter(|name| !name.trim().is_empty())
                .map(ProviderKind::from_str)
                .collect::<Result<_, _>>()?;
        }

        if let Ok(url) = std::env::var("RATEFEED_PAIRS_URL") {
            config.pairs_url = url;
        }

        if let Ok(url) = std::env::var("RATEFEED_FLAT_URL") {
            config.flat_url = url;
        }

        if let Ok(secs) = std::env::var("RATEFEED_PROVIDER_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
            }
        }

        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.providers.is_empty() {
            return Err("At least one provider must be configured".to_string());
        }

        if self.symbols.is_empty() {
            return Err("Symbol set cannot be empty".to_string());
        }

        let mut seen = Vec::new();
        for kind in &self.providers {
            if seen.contains(kind) {
                return Err(format!("Provider {} listed more than once", kind));
            }
            seen.push(*kind);
        }

        Ok(())
    }
}
