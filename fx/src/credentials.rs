//! Provider secrets, injected by the hosting runtime.

use std::collections::HashMap;
use std::fmt;

use crate::error::{FxError, FxResult};

/// Secrets keyed by provider name.
#[derive(Clone, Default)]
pub struct Credentials {
    secrets: HashMap<String, String>,
}

impl Credentials {
    /// Create an empty credential set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load secrets from `RATEFEED_<PROVIDER>_TOKEN` variables for the
    /// known providers.
    pub fn from_env() -> Self {
        let mut credentials = Self::new();

        for provider in ["pairs", "flat"] {
            let var = format!("RATEFEED_{}_TOKEN", provider.to_uppercase());
            if let Ok(secret) = std::env::var(&var) {
                credentials.insert(provider, secret);
            }
        }

        credentials
    }

    /// Set the secret for a provider.
    pub fn insert(&mut self, provider: impl Into<String>, secret: impl Into<String>) {
        self.secrets.insert(provider.into(), secret.into());
    }

    /// Builder form of [`Credentials::insert`].
    pub fn with(mut self, provider: impl Into<String>, secret: impl Into<String>) -> Self {
        self.insert(provider, secret);
        self
    }

    /// Get a non-empty secret for a provider.
    pub fn get(&self, provider: &str) -> Option<&str> {
        self.secrets
            .get(provider)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// Get a secret or fail with a configuration error.
    pub fn require(&self, provider: &str) -> FxResult<&str> {
        self.get(provider).ok_or_else(|| FxError::MissingCredential {
            provider: provider.to_string(),
            key: format!("RATEFEED_{}_TOKEN", provider.to_uppercase()),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the secrets themselves.
        let mut providers: Vec<&str> = self.secrets.keys().map(String::as_str).collect();
        providers.sort_unstable();
        f.debug_struct("Credentials")
            .field("providers", &providers)
            .finish()
    }
}
