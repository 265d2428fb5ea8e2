//! Direct-pair provider.
//!
//! Queries `USD-XXX` pairs for fiat and `XXX-USD` pairs for assets in a single
//! request. The response is an object keyed by the concatenated pair:
//!
//! ```json
//! {
//!   "USDBRL": { "code": "USD", "codein": "BRL", "bid": "5.0012", "timestamp": "1700000000" },
//!   "BTCUSD": { "code": "BTC", "codein": "USD", "bid": "60000", "timestamp": "1700000042" }
//! }
//! ```
//!
//! `bid` is quote units per one base unit, so asset pairs are inverted.

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

/// One entry of the pair response.
#[derive(Debug, Deserialize)]
struct PairQuote {
    code: String,
    codein: String,
    bid: Numeric,
    #[serde(default)]
    timestamp: Option<Numeric>,
}

/// Provider for direct currency pairs, authenticated by a query token.
pub struct PairQuoteProvider {
    client: Client,
    base_url: String,
    symbols: SymbolSet,
}

impl PairQuoteProvider {
    /// Create a provider from the chain configuration.
    pub fn new(config: &FxConfig) -> Self {
        Self::with_client(
            http_client(config.request_timeout),
            &config.pairs_url,
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

    /// Comma-separated pair list for the whole symbol universe.
    fn pair_list(&self) -> String {
        let fiat = self.symbols.fiat().map(|s| format!("USD-{}", s));
        let assets = self.symbols.assets().map(|s| format!("{}-USD", s));
        fiat.chain(assets).collect::<Vec<_>>().join(",")
    }
}

#[async_trait]
impl RateProvider for PairQuoteProvider {
    fn name(&self) -> &str {
        ProviderKind::Pairs.name()
    }

    #[instrument(skip_all, fields(provider = self.name()))]
    async fn resolve(&self, credentials: &Credentials) -> FxResult<ProviderRates> {
        let token = credentials.require(self.name())?;

        let url = format!("{}/json/last/{}", self.base_url, self.pair_list());
        let request = self.client.get(&url).query(&[("token", token)]);
        let body = fetch_json(self.name(), request).await?;

        let normalized = normalize_pairs(self.name(), &body)?;
        if normalized.rates.is_empty() {
            return Err(FxError::NoUsableRates {
                provider: self.name().to_string(),
            });
        }

        Ok(normalized)
    }
}

/// Normalize a pair response into units per USD.
///
/// Entries that are malformed, have an unparseable or non-positive bid, or
/// do not involve USD are skipped. The freshness marker is the latest
/// timestamp among the entries that were kept.
pub(crate) fn normalize_pairs(provider: &str, body: &Value) -> FxResult<ProviderRates> {
    let entries = body.as_object().ok_or_else(|| FxError::Parse {
        provider: provider.to_string(),
        message: "expected an object keyed by pair".to_string(),
    })?;

    let mut rates = RateMapping::new();
    let mut freshness: Option<i64> = None;

    for (key, entry) in entries {
        let quote = match PairQuote::deserialize(entry) {
            Ok(quote) => quote,
            Err(e) => {
                debug!(pair = %key, error = %e, "Skipping malformed pair");
                continue;
            }
        };

        let Some(bid) = quote.bid.as_f64() else {
            debug!(pair = %key, "Skipping pair with unparseable bid");
            continue;
        };

        let base = Symbol::new(quote.code);
        let counter = Symbol::new(quote.codein);

        let stored = match (base.is_usd(), counter.is_usd()) {
            (true, false) => rates.insert(counter, bid),
            (false, true) => bid > 0.0 && rates.insert(base, 1.0 / bid),
            _ => false,
        };

        if !stored {
            debug!(pair = %key, bid, "Skipping pair without a usable rate");
            continue;
        }

        if let Some(ts) = quote.timestamp.as_ref().and_then(Numeric::as_unix_seconds) {
            if ts > 0 {
                freshness = Some(freshness.map_or(ts, |current| current.max(ts)));
            }
        }
    }

    Ok(ProviderRates::new(rates).with_freshness(freshness))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::spawn_upstream;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn symbols() -> SymbolSet {
        SymbolSet::new(
            vec![Symbol::new("BRL"), Symbol::new("EUR")],
            vec![Symbol::new("BTC")],
        )
        .unwrap()
    }

    #[test]
    fn test_fiat_pair_kept_as_is() {
        let body = json!({
            "USDBRL": { "code": "USD", "codein": "BRL", "bid": "5.00", "timestamp": "1700000000" }
        });

        let result = normalize_pairs("pairs", &body).unwrap();

        assert_eq!(result.rates.get(&Symbol::new("BRL")), Some(5.0));
        assert_eq!(result.freshness, Some(1_700_000_000));
    }

    #[test]
    fn test_asset_pair_inverted() {
        let body = json!({
            "BTCUSD": { "code": "BTC", "codein": "USD", "bid": "60000" }
        });

        let result = normalize_pairs("pairs", &body).unwrap();

        assert_eq!(result.rates.get(&Symbol::new("BTC")), Some(1.0 / 60000.0));
        assert_eq!(result.freshness, None);
    }

    #[test]
    fn test_bad_entries_skipped() {
        let body = json!({
            "USDBRL": { "code": "USD", "codein": "BRL", "bid": "5.00", "timestamp": "1700000000" },
            "USDEUR": { "code": "USD", "codein": "EUR", "bid": "n/a", "timestamp": "1800000000" },
            "BTCUSD": { "code": "BTC", "codein": "USD", "bid": "0" },
            "EURBRL": { "code": "EUR", "codein": "BRL", "bid": "6.1" },
            "broken": "not an object"
        });

        let result = normalize_pairs("pairs", &body).unwrap();

        assert_eq!(result.rates.len(), 1);
        assert_eq!(result.rates.get(&Symbol::new("BRL")), Some(5.0));
        // Skipped entries do not contribute their timestamps.
        assert_eq!(result.freshness, Some(1_700_000_000));
    }

    #[test]
    fn test_freshness_is_max_timestamp() {
        let body = json!({
            "USDBRL": { "code": "USD", "codein": "BRL", "bid": 5.0, "timestamp": 1_700_000_000 },
            "BTCUSD": { "code": "BTC", "codein": "USD", "bid": "60000", "timestamp": "1700000042" },
            "USDEUR": { "code": "USD", "codein": "EUR", "bid": "0.92", "timestamp": "0" }
        });

        let result = normalize_pairs("pairs", &body).unwrap();

        assert_eq!(result.rates.len(), 3);
        assert_eq!(result.freshness, Some(1_700_000_042));
    }

    #[test]
    fn test_non_object_body_is_parse_error() {
        let err = normalize_pairs("pairs", &json!(["USDBRL"])).unwrap_err();
        assert!(matches!(err, FxError::Parse { .. }));
    }

    proptest! {
        #[test]
        fn prop_usd_base_pair_is_rate(bid in 1e-6f64..1e6) {
            let body = json!({ "USDBRL": { "code": "USD", "codein": "BRL", "bid": bid.to_string() } });
            let result = normalize_pairs("pairs", &body).unwrap();
            prop_assert_eq!(result.rates.get(&Symbol::new("BRL")), Some(bid));
        }

        #[test]
        fn prop_asset_base_pair_is_inverse(bid in 1e-6f64..1e6) {
            let body = json!({ "BTCUSD": { "code": "BTC", "codein": "USD", "bid": bid.to_string() } });
            let result = normalize_pairs("pairs", &body).unwrap();
            prop_assert_eq!(result.rates.get(&Symbol::new("BTC")), Some(1.0 / bid));
        }
    }

    #[tokio::test]
    async fn test_resolve_requests_all_pairs_with_token() {
        let router = Router::new().route(
            "/json/last/:pairs",
            get(
                |Path(pairs): Path<String>, Query(query): Query<HashMap<String, String>>| async move {
                    if query.get("token").map(String::as_str) != Some("abc")
                        || pairs != "USD-BRL,USD-EUR,BTC-USD"
                    {
                        return (StatusCode::UNAUTHORIZED, Json(json!({})));
                    }
                    (
                        StatusCode::OK,
                        Json(json!({
                            "USDBRL": { "code": "USD", "codein": "BRL", "bid": "5.00", "timestamp": "1700000000" },
                            "BTCUSD": { "code": "BTC", "codein": "USD", "bid": "50000", "timestamp": "1700000100" }
                        })),
                    )
                },
            ),
        );
        let base = spawn_upstream(router).await;

        let provider = PairQuoteProvider::with_client(Client::new(), &base, symbols());
        let credentials = Credentials::new().with("pairs", "abc");
        let result = provider.resolve(&credentials).await.unwrap();

        assert_eq!(result.rates.get(&Symbol::new("BRL")), Some(5.0));
        assert_eq!(result.rates.get(&Symbol::new("BTC")), Some(1.0 / 50000.0));
        assert_eq!(result.freshness, Some(1_700_000_100));
    }

    #[tokio::test]
    async fn test_resolve_status_error() {
        let router = Router::new().route(
            "/json/last/:pairs",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base = spawn_upstream(router).await;

        let provider = PairQuoteProvider::with_client(Client::new(), &base, symbols());
        let credentials = Credentials::new().with("pairs", "abc");
        let err = provider.resolve(&credentials).await.unwrap_err();

        assert!(matches!(err, FxError::Status { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_resolve_all_entries_unusable() {
        let router = Router::new().route(
            "/json/last/:pairs",
            get(|| async { Json(json!({ "USDBRL": { "code": "USD", "codein": "BRL", "bid": "" } })) }),
        );
        let base = spawn_upstream(router).await;

        let provider = PairQuoteProvider::with_client(Client::new(), &base, symbols());
        let credentials = Credentials::new().with("pairs", "abc");
        let err = provider.resolve(&credentials).await.unwrap_err();

        assert!(matches!(err, FxError::NoUsableRates { .. }));
    }

    #[tokio::test]
    async fn test_missing_token_skips_network() {
        // Nothing listens on the discard port; a request would be a transport error.
        let provider =
            PairQuoteProvider::with_client(Client::new(), "http://127.0.0.1:9", symbols());
        let err = provider.resolve(&Credentials::new()).await.unwrap_err();

        assert!(matches!(err, FxError::MissingCredential { .. }));
    }
}
