//! Error types for the subconscious memory engine

use crate::memory::store::StoreError;
use thiserror::Error;

/// Result type alias for engine operations
pub type SubconsciousResult<T> = Result<T, SubconsciousError>;

/// Main error type for the subconscious memory engine
#[derive(Error, Debug)]
pub enum SubconsciousError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// An unsupported value was supplied at a configuration boundary
    #[error("Unsupported {what}: {value}")]
    UnsupportedOption { what: String, value: String },

    /// Text generation errors
    #[error("Text generation error: {0}")]
    Llm(String),

    /// Memory store errors (collection creation and writes propagate these)
    #[error("Memory store error: {0}")]
    Store(#[from] StoreError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Operation timeout
    #[error("Timeout after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

impl SubconsciousError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new unsupported-option error
    pub fn unsupported(what: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnsupportedOption {
            what: what.into(),
            value: value.into(),
        }
    }

    /// Create a new text generation error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create a new timeout error
    pub const fn timeout(seconds: u64) -> Self {
        Self::Timeout { seconds }
    }
}

impl From<anyhow::Error> for SubconsciousError {
    fn from(error: anyhow::Error) -> Self {
        Self::Other(error.to_string())
    }
}

impl From<serde_json::Error> for SubconsciousError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}

impl From<reqwest::Error> for SubconsciousError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.to_string())
    }
}
