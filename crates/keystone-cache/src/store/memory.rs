//! In-process key-value store.
//!
//! Intended for local development and tests. Entries live in a single map
//! guarded by a read-write lock. Expiry is checked on access, and every
//! [`SWEEP_INTERVAL`] writes the map is swept so keys that are never read
//! again do not accumulate.

use super::KeyValueStore;
use crate::error::CacheResult;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Writes between two sweeps of expired entries.
pub const SWEEP_INTERVAL: usize = 256;

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    /// `None` when the TTL reaches past the clock's range.
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// In-memory key-value store with per-entry TTL.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoredValue>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries that have not expired.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.read().values().filter(|entry| !entry.is_expired(now)).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remaining time to live for `key`, if it is present.
    ///
    /// An entry whose TTL is too large to track never expires and reports
    /// [`Duration::MAX`].
    #[must_use]
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .read()
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.expires_at.map_or(Duration::MAX, |at| at - now))
    }

    /// Remove every expired entry, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        Self::sweep(&mut self.entries.write(), Instant::now())
    }

    fn sweep(entries: &mut HashMap<String, StoredValue>, now: Instant) -> usize {
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        // Expired: drop it unless a writer replaced it in the meantime.
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let now = Instant::now();
        let entry = StoredValue {
            value: value.to_string(),
            expires_at: now.checked_add(ttl),
        };

        let mut entries = self.entries.write();
        entries.insert(key.to_string(), entry);
        if (self.writes.fetch_add(1, Ordering::Relaxed) + 1) % SWEEP_INTERVAL == 0 {
            let dropped = Self::sweep(&mut entries, now);
            if dropped > 0 {
                debug!(dropped, remaining = entries.len(), "Swept expired entries");
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        let now = Instant::now();
        let removed = self.entries.write().remove(key);
        Ok(removed.is_some_and(|entry| !entry.is_expired(now)))
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
