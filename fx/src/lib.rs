//! Ratefeed FX providers
//!
//! Upstream rate providers and the ordered fallback that turns them into a
//! single USD-based rate payload.
//!
//! # Features
//!
//! - One adapter per upstream source, each normalizing its native format
//! - Strict priority order: the first provider with usable rates wins
//! - Fixed `USD = 1` entry and provider-supplied freshness timestamps
//!
//! # Example
//!
//! ```rust,ignore
//! use ratefeed_fx::{Credentials, FallbackAggregator, FxConfig};
//!
//! let aggregator = FallbackAggregator::from_config(&FxConfig::default())?;
//! let credentials = Credentials::from_env();
//!
//! let payload = aggregator.resolve(&credentials).await?;
//! ```

pub mod aggregator;
pub mod config;
pub mod credentials;
pub mod error;
pub mod flat;
pub mod pairs;
pub mod provider;

pub use aggregator::FallbackAggregator;
pub use config::{FxConfig, ProviderKind};
pub use credentials::Credentials;
pub use error::{FxError, FxResult};
pub use flat::FlatRateProvider;
pub use pairs::PairQuoteProvider;
pub use provider::{ProviderRates, RateProvider};

#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateProvider;
