//! Error types for the circuit_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for circuit_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Difficulty rating outside 1..=5
    #[error("Invalid difficulty rating {0} (expected 1-5)")]
    InvalidRating(u8),

    /// Session or preferences store error
    #[error("Store error: {0}")]
    Store(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
