//! Unified error type shared across Keystone crates.

use thiserror::Error;

/// Unified error type for Keystone.
///
/// Crate-local error enums (such as the cache error) convert into this type
/// at crate boundaries so that callers only deal with one error surface.
#[derive(Error, Debug)]
pub enum KeystoneError {
    /// Validation error (bad caller input)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Cache/key-value store error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Bug or unexpected state
    #[error("Internal error: {0}")]
    Internal(String),

    /// Anything else, carried through `anyhow`
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KeystoneError {
    /// Stable code for logs and API payloads.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration<T: Into<String>>(message: T) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// True when retrying the operation may succeed (store failures).
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Cache(_))
    }
}

impl From<serde_json::Error> for KeystoneError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {err}"))
    }
}
