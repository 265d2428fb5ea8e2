//! Error types shared across Ratefeed crates.

use thiserror::Error;

/// Errors raised while building shared rate types.
#[derive(Error, Debug)]
pub enum RatefeedError {
    /// Fiat and asset sets overlap or are otherwise unusable.
    #[error("Invalid symbol set: {0}")]
    InvalidSymbolSet(String),

    /// A payload could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for shared operations.
pub type Result<T> = std::result::Result<T, RatefeedError>;
