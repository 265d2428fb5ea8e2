//! FX provider error types.

use thiserror::Error;

/// Errors that can occur while fetching or aggregating rates.
#[derive(Debug, Error)]
pub enum FxError {
    /// A required credential is absent; no request was made.
    #[error("Configuration error: {provider} requires credential {key}")]
    MissingCredential { provider: String, key: String },

    /// Provider configuration is unusable.
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// The request could not be completed.
    #[error("Transport error from {provider}: {message}")]
    Transport { provider: String, message: String },

    /// The provider answered with a non-2xx status.
    #[error("Transport error from {provider}: HTTP status {status}")]
    Status { provider: String, status: u16 },

    /// The response body does not have the expected shape.
    #[error("Parse error from {provider}: {message}")]
    Parse { provider: String, message: String },

    /// The provider answered but no entry yielded a usable rate.
    #[error("No usable rates from {provider}")]
    NoUsableRates { provider: String },

    /// Every configured provider failed or returned nothing.
    #[error("all rate providers unavailable")]
    AllProvidersFailed,
}

impl FxError {
    /// Error class for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            FxError::MissingCredential { .. } | FxError::InvalidConfig(_) => "CONFIGURATION_ERROR",
            FxError::Transport { .. } | FxError::Status { .. } => "TRANSPORT_ERROR",
            FxError::Parse { .. } => "PARSE_ERROR",
            FxError::NoUsableRates { .. } => "EMPTY_RESULT",
            FxError::AllProvidersFailed => "AGGREGATE_EXHAUSTION",
        }
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_mentions_code() {
        let err = FxError::Status {
            provider: "pairs".to_string(),
            status: 502,
        };
        assert!(err.to_string().contains("502"));
        assert_eq!(err.kind(), "TRANSPORT_ERROR");
    }

    #[test]
    fn test_exhaustion_message() {
        assert_eq!(
            FxError::AllProvidersFailed.to_string(),
            "all rate providers unavailable"
        );
    }
}
