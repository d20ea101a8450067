//! Error types for riskmap

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RiskmapError {
    // Fetch errors
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("response is not a valid GeoJSON document: {reason}")]
    Parse { reason: String },

    #[error("feature collection is missing its features array")]
    Schema,

    // Configuration errors
    #[error("invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RiskmapError>;
