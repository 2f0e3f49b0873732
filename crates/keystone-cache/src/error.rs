//! Cache error types.

use keystone_core::KeystoneError;
use std::time::Duration;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-related errors.
///
/// Variants fall into two groups: caller contract violations (wrong key
/// arity, blank key argument, bad TTL), which are reported regardless of
/// store health, and store failures, which the cache client only surfaces
/// on writes.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Wrong number of key arguments for a category's template.
    #[error("Key template for {category} takes {expected} argument(s), got {actual}")]
    ArityMismatch {
        category: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A key argument is empty or whitespace.
    #[error("Key argument {index} for {category} is blank")]
    BlankArgument { category: &'static str, index: usize },

    /// TTL that is not a whole, non-zero number of seconds.
    #[error("TTL must be a whole number of seconds and at least one second, got {0:?}")]
    InvalidTtl(Duration),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] deadpool_redis::redis::RedisError),

    /// Redis pool error.
    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    /// Any other store failure.
    #[error("Store error: {0}")]
    Backend(String),

    /// The store is disabled and cannot accept writes.
    #[error("Cache store is disabled")]
    Disabled,
}

impl CacheError {
    /// Returns true if this error is the caller's fault rather than the store's.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            CacheError::ArityMismatch { .. } | CacheError::BlankArgument { .. } | CacheError::InvalidTtl(_)
        )
    }

    /// Returns true if retrying the same call could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CacheError::Redis(_) | CacheError::Pool(_) | CacheError::Backend(_)
        )
    }
}

impl From<CacheError> for KeystoneError {
    fn from(err: CacheError) -> Self {
        if err.is_contract_violation() {
            KeystoneError::Validation(err.to_string())
        } else {
            KeystoneError::Cache(err.to_string())
        }
    }
}
