//! Configuration errors
//!
//! The simulation itself has no recoverable failure modes; everything that
//! can go wrong is caught when a `GameConfig` is validated.

/// Why a configuration was rejected
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Value is NaN or infinite
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    /// Size, speed or duration that must be strictly positive
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    /// Probability or fraction outside [0, 1]
    #[error("{field} must be within [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f64 },

    /// Min/max pair where min exceeds max
    #[error("{field}: minimum {min} exceeds maximum {max}")]
    InvertedRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    /// Cross-field constraint that does not hold
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// JSON could not be parsed into a config
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}
