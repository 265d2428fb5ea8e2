//! Flat-list provider.
//!
//! Returns one entry per target currency, already based on USD:
//!
//! ```json
//! [ { "source": "USD", "target": "BRL", "rate": 5.0012 } ]
//! ```

use async_trait::async_trait;
use ratefeed_common::{RateMapping, Symbol, SymbolSet};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::{FxConfig, ProviderKind};
use crate::credentials::Credentials;
use crate::error::{FxError, FxResult};
use crate::provider::{fetch_json, http_client, Numeric, ProviderRates, RateProvider};

#[derive(Debug, Deserialize)]
struct FlatRate {
    #[serde(default)]
    source: Option<String>,
    target: String,
    rate: Numeric,
}

/// Provider for USD-based rate lists, authenticated by a bearer token.
pub struct FlatRateProvider {
    client: Client,
    base_url: String,
    symbols: SymbolSet,
}

impl FlatRateProvider {
    /// Create a provider from the chain configuration.
    pub fn new(config: &FxConfig) -> Self {
        Self::with_client(
            http_client(config.request_timeout),
            &config.flat_url,
            config.symbols.clone(),
        )
    }

    /// Create a provider with an existing HTTP client.
    pub fn with_client(client: Client, base_url: &str, symbols: SymbolSet) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            symbols,
        }
    }
}

#[async_trait]
impl RateProvider for FlatRateProvider {
    fn name(&self) -> &str {
        ProviderKind::Flat.name()
    }

    #[instrument(skip_all, fields(provider = self.name()))]
    async fn resolve(&self, credentials: &Credentials) -> FxResult<ProviderRates> {
        let token = credentials.require(self.name())?;

        let request = self
            .client
            .get(format!("{}/v1/rates", self.base_url))
            .query(&[("source", "USD")])
            .bearer_auth(token);
        let body = fetch_json(self.name(), request).await?;

        let normalized = normalize_flat(self.name(), &body, &self.symbols)?;
        if normalized.rates.is_empty() {
            return Err(FxError::NoUsableRates {
                provider: self.name().to_string(),
            });
        }

        Ok(normalized)
    }
}

/// Keep every configured target verbatim. No freshness marker is reported.
pub(crate) fn normalize_flat(
    provider: &str,
    body: &Value,
    symbols: &SymbolSet,
) -> FxResult<ProviderRates> {
    let entries = body.as_array().ok_or_else(|| FxError::Parse {
        provider: provider.to_string(),
        message: "expected an array of rates".to_string(),
    })?;

    let mut rates = RateMapping::new();

    for entry in entries {
        let Ok(item) = FlatRate::deserialize(entry) else {
            debug!("Skipping malformed rate entry");
            continue;
        };

        if item.source.as_deref().is_some_and(|s| !s.eq_ignore_ascii_case("USD")) {
            continue;
        }

        let target = Symbol::new(item.target);
        if !symbols.contains(&target) {
            continue;
        }

        let stored = item
            .rate
            .as_f64()
            .is_some_and(|rate| rates.insert(target.clone(), rate));
        if !stored {
            debug!(target = %target, "Skipping rate that is not a positive number");
        }
    }

    Ok(ProviderRates::new(rates))
}
