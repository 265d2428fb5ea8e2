//! Ordered fallback across rate providers.

use std::sync::Arc;

use ratefeed_common::{freshness_or_now, AggregatedPayload};
use tracing::{info, instrument, warn};

use crate::config::{FxConfig, ProviderKind};
use crate::credentials::Credentials;
use crate::error::{FxError, FxResult};
use crate::flat::FlatRateProvider;
use crate::pairs::PairQuoteProvider;
use crate::provider::RateProvider;

/// Walks providers in priority order and adopts the first usable answer.
///
/// Providers are consulted one at a time. Once a provider yields a non-empty
/// mapping the remaining ones are never called, and rates from different
/// providers are never merged.
pub struct FallbackAggregator {
    providers: Vec<Arc<dyn RateProvider>>,
}

impl FallbackAggregator {
    /// Create an aggregator over providers, primary first.
    pub fn new(providers: Vec<Arc<dyn RateProvider>>) -> Self {
        Self { providers }
    }

    /// Build the provider chain declared in the configuration.
    pub fn from_config(config: &FxConfig) -> FxResult<Self> {
        config.validate().map_err(FxError::InvalidConfig)?;

        let providers = config
            .providers
            .iter()
            .map(|kind| -> Arc<dyn RateProvider> {
                match kind {
                    ProviderKind::Pairs => Arc::new(PairQuoteProvider::new(config)),
                    ProviderKind::Flat => Arc::new(FlatRateProvider::new(config)),
                }
            })
            .collect();

        Ok(Self::new(providers))
    }

    /// Provider names in priority order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Resolve the rate payload for one request cycle.
    ///
    /// Returns [`FxError::AllProvidersFailed`] when no provider produced a
    /// usable mapping. Per-provider causes are only logged.
    #[instrument(skip_all)]
    pub async fn resolve(&self, credentials: &Credentials) -> FxResult<AggregatedPayload> {
        for provider in &self.providers {
            match provider.resolve(credentials).await {
                Ok(quote) if !quote.rates.is_empty() => {
                    let updated_at = freshness_or_now(quote.freshness);
                    info!(
                        provider = provider.name(),
                        symbols = quote.rates.len(),
                        updated_at,
                        "Rates resolved"
                    );
                    return Ok(AggregatedPayload::success(quote.rates, updated_at));
                }
                Ok(_) => {
                    warn!(provider = provider.name(), "Provider returned no rates");
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        kind = e.kind(),
                        error = %e,
                        "Provider failed to return rates"
                    );
                }
            }
        }

        Err(FxError::AllProvidersFailed)
    }
}
