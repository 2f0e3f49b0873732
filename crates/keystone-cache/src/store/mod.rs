//! Key-value store abstraction.
//!
//! The cache client talks to its backing store only through
//! [`KeyValueStore`], so Redis, the in-process store and test doubles are
//! interchangeable.

mod memory;
mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::{create_pool, RedisStore, RedisStoreParameters};

use crate::error::CacheResult;
use async_trait::async_trait;
use shaku::Interface;
use std::time::Duration;

/// External key-value store with per-entry expiry.
///
/// An entry that was never written and one whose TTL has elapsed are
/// indistinguishable: `get` returns `None` for both. Implementations report
/// failures as errors and leave the containment policy to the cache client.
#[async_trait]
pub trait KeyValueStore: Interface + Send + Sync {
    /// Get the raw value stored under `key`.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value, expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Delete `key`.
    ///
    /// Returns `true` if the key existed and was deleted.
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Check if the store accepts operations.
    fn is_enabled(&self) -> bool;

    /// Short backend name for logs and metrics.
    fn backend(&self) -> &'static str;
}
