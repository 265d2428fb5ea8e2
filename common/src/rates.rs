//! USD-based rate mappings and the payload served to clients.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::symbol::Symbol;

/// Units of each symbol obtainable for 1 USD.
///
/// Every stored value is finite and strictly positive. The USD entry, when
/// present, is always exactly 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateMapping(BTreeMap<Symbol, f64>);

impl RateMapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a rate. Returns false, leaving the mapping untouched, when the
    /// value is not a finite positive number.
    pub fn insert(&mut self, symbol: Symbol, units_per_usd: f64) -> bool {
        if !units_per_usd.is_finite() || units_per_usd <= 0.0 {
            return false;
        }

        let value = if symbol.is_usd() { 1.0 } else { units_per_usd };
        self.0.insert(symbol, value);
        true
    }

    /// Pin the USD entry to exactly 1, overriding anything a provider sent.
    pub fn with_usd_base(mut self) -> Self {
        self.0.insert(Symbol::usd(), 1.0);
        self
    }

    /// Get the rate for a symbol.
    pub fn get(&self, symbol: &Symbol) -> Option<f64> {
        self.0.get(symbol).copied()
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no rates are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over symbol/rate pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, f64)> {
        self.0.iter().map(|(symbol, rate)| (symbol, *rate))
    }
}

/// Response body for a single request cycle.
///
/// On success carries `rates` and `updated_at`; on failure only `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedPayload {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rates: Option<RateMapping>,
    /// Freshness of the rates, unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AggregatedPayload {
    /// Successful payload. The USD entry is pinned to 1.
    pub fn success(rates: RateMapping, updated_at: i64) -> Self {
        Self {
            success: true,
            rates: Some(rates.with_usd_base()),
            updated_at: Some(updated_at),
            error: None,
        }
    }

    /// Degraded payload carrying only an error description.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            rates: None,
            updated_at: None,
            error: Some(error.into()),
        }
    }

    /// Serialize to the JSON wire format.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_rejects_non_positive() {
        let mut rates = RateMapping::new();

        assert!(!rates.insert(Symbol::new("BRL"), 0.0));
        assert!(!rates.insert(Symbol::new("BRL"), -5.0));
        assert!(!rates.insert(Symbol::new("BRL"), f64::NAN));
        assert!(!rates.insert(Symbol::new("BTC"), f64::INFINITY));
        assert!(rates.is_empty());

        assert!(rates.insert(Symbol::new("BRL"), 5.0));
        assert_eq!(rates.get(&Symbol::new("BRL")), Some(5.0));
    }

    #[test]
    fn test_usd_always_one() {
        let mut rates = RateMapping::new();
        rates.insert(Symbol::usd(), 1.2);
        assert_eq!(rates.get(&Symbol::usd()), Some(1.0));

        let rates = RateMapping::new().with_usd_base();
        assert_eq!(rates.get(&Symbol::usd()), Some(1.0));
    }

    #[test]
    fn test_success_payload_shape() {
        let mut rates = RateMapping::new();
        rates.insert(Symbol::new("BRL"), 5.0);

        let payload = AggregatedPayload::success(rates, 1_700_000_000);
        let value: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "success": true,
                "rates": { "BRL": 5.0, "USD": 1.0 },
                "updated_at": 1_700_000_000
            })
        );
    }

    #[test]
    fn test_failure_payload_shape() {
        let payload = AggregatedPayload::failure("all rate providers unavailable");
        let value: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({ "success": false, "error": "all rate providers unavailable" })
        );
    }
}
