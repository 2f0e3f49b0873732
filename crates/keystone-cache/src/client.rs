//! Typed cache client.
//!
//! [`CacheClient`] derives keys from a [`CacheCategory`] and its positional
//! arguments and forwards single-key operations to a shared
//! [`KeyValueStore`].
//!
//! Store failures are handled asymmetrically:
//!
//! - `get`, `get_as`, `exists` and `delete` log the failure and behave as a
//!   miss or a no-op. The cache is an optimization, and an entry that failed
//!   to delete still expires on its own.
//! - `put` and `put_with_ttl` return the failure. A write that silently
//!   failed would let a caller believe an idempotency marker exists.
//!
//! Caller contract violations (wrong argument count, blank argument, TTL
//! that is not a whole number of seconds) are returned by every operation,
//! whatever the state of the store.

use crate::category::CacheCategory;
use crate::error::{CacheError, CacheResult};
use crate::metrics::CacheMetrics;
use crate::store::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::any::type_name;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Cache client over a shared key-value store.
///
/// Cloning is cheap and clones share the store handle. The client keeps no
/// state of its own, so concurrent calls need no coordination beyond what
/// the store provides.
#[derive(Clone)]
pub struct CacheClient {
    store: Arc<dyn KeyValueStore>,
}

impl CacheClient {
    /// Create a client over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Check if the underlying store is enabled.
    pub fn is_enabled(&self) -> bool {
        self.store.is_enabled()
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Check if a value is cached for `args`.
    ///
    /// Same as `get(category, args)` returning `Some`.
    pub async fn exists(&self, category: CacheCategory, args: &[&str]) -> CacheResult<bool> {
        Ok(self.get(category, args).await?.is_some())
    }

    /// Get the cached value for `args` as text.
    ///
    /// A stored JSON string is returned without its quotes; any other JSON
    /// value is returned as JSON text. Misses, expired entries and store
    /// failures all yield `Ok(None)`.
    pub async fn get(&self, category: CacheCategory, args: &[&str]) -> CacheResult<Option<String>> {
        let key = category.render_key(args)?;
        Ok(self.fetch(category, &key).await.map(into_text))
    }

    /// Get the cached value for `args` decoded as `T`.
    ///
    /// A stored value that does not decode into `T` is logged and treated
    /// as a miss.
    pub async fn get_as<T>(&self, category: CacheCategory, args: &[&str]) -> CacheResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let key = category.render_key(args)?;
        let Some(raw) = self.fetch(category, &key).await else {
            return Ok(None);
        };

        match serde_json::from_str::<T>(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(
                    category = category.name(),
                    key = %key,
                    expected = type_name::<T>(),
                    actual = json_shape(&raw),
                    error = %e,
                    "Value type mismatch"
                );
                CacheMetrics::type_mismatch(category.name(), type_name::<T>());
                Ok(None)
            }
        }
    }

    /// Store `value` for `args` with the category's default TTL.
    pub async fn put<T>(&self, category: CacheCategory, value: &T, args: &[&str]) -> CacheResult<()>
    where
        T: Serialize + ?Sized,
    {
        self.put_with_ttl(category, value, category.default_ttl(), args).await
    }

    /// Store `value` for `args`, expiring after `ttl`.
    ///
    /// `ttl` must be a whole, non-zero number of seconds. Serialization and
    /// store failures are returned to the caller.
    pub async fn put_with_ttl<T>(
        &self,
        category: CacheCategory,
        value: &T,
        ttl: Duration,
        args: &[&str],
    ) -> CacheResult<()>
    where
        T: Serialize + ?Sized,
    {
        let key = category.render_key(args)?;
        if ttl.as_secs() == 0 || ttl.subsec_nanos() != 0 {
            return Err(CacheError::InvalidTtl(ttl));
        }
        let payload = serde_json::to_string(value)?;

        match self.store.set(&key, &payload, ttl).await {
            Ok(()) => {
                debug!(category = category.name(), key = %key, ttl_secs = ttl.as_secs(), "Cache stored");
                CacheMetrics::write(category.name());
                Ok(())
            }
            Err(e) => {
                error!(
                    category = category.name(),
                    key = %key,
                    backend = self.store.backend(),
                    error = %e,
                    "Error storing value in cache"
                );
                CacheMetrics::write_failed(category.name());
                Err(e)
            }
        }
    }

    /// Delete the cached value for `args`.
    ///
    /// Store failures are logged and swallowed; the entry still expires
    /// with its TTL.
    pub async fn delete(&self, category: CacheCategory, args: &[&str]) -> CacheResult<()> {
        let key = category.render_key(args)?;

        match self.store.delete(&key).await {
            Ok(existed) => debug!(category = category.name(), key = %key, existed, "Cache deleted"),
            Err(e) => {
                error!(
                    category = category.name(),
                    key = %key,
                    backend = self.store.backend(),
                    error = %e,
                    "Error deleting key from cache"
                );
                CacheMetrics::contained_error(category.name(), "delete");
            }
        }

        Ok(())
    }

    /// Read the raw stored payload, turning store failures into misses.
    async fn fetch(&self, category: CacheCategory, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(Some(raw)) => {
                debug!(category = category.name(), key, "Cache hit");
                CacheMetrics::hit(category.name());
                Some(raw)
            }
            Ok(None) => {
                debug!(category = category.name(), key, "Cache miss");
                CacheMetrics::miss(category.name());
                None
            }
            Err(e) => {
                error!(
                    category = category.name(),
                    key,
                    backend = self.store.backend(),
                    error = %e,
                    "Error retrieving value from cache"
                );
                CacheMetrics::contained_error(category.name(), "get");
                None
            }
        }
    }
}

/// Text form of a stored payload: JSON strings lose their quotes, anything
/// else is returned as stored.
fn into_text(raw: String) -> String {
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::String(text)) => text,
        _ => raw,
    }
}

/// Name of the JSON shape of a stored payload, for diagnostics.
fn json_shape(raw: &str) -> &'static str {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Null) => "null",
        Ok(Value::Bool(_)) => "boolean",
        Ok(Value::Number(_)) => "number",
        Ok(Value::String(_)) => "string",
        Ok(Value::Array(_)) => "array",
        Ok(Value::Object(_)) => "object",
        Err(_) => "non-JSON text",
    }
}
