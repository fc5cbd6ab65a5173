//! Error types for geostore.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = GeoStoreError> = std::result::Result<T, E>;

/// Errors produced by the store, its cache and the boundary helpers.
#[derive(Debug, Error)]
pub enum GeoStoreError {
    /// Invalid construction parameters (cache sizing, bounds, thresholds).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The pre-scan candidate estimate exceeded the caller supplied limit.
    #[error("Too many candidates: estimate {estimate} exceeds limit {limit}")]
    CandidateOverflow { estimate: usize, limit: usize },

    /// Missing or unparseable request parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "toml")]
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl GeoStoreError {
    /// Whether the caller can retry the operation with different arguments.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GeoStoreError::CandidateOverflow { .. } | GeoStoreError::InvalidInput(_)
        )
    }
}
