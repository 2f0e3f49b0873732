//! Test doubles for the key-value store.

#![allow(dead_code)]

use async_trait::async_trait;
use keystone_cache::{CacheError, CacheResult, KeyValueStore, MemoryStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A call made against a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Get(String),
    Set { key: String, value: String, ttl: Duration },
    Delete(String),
}

/// In-memory store that records every call it receives.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    calls: Mutex<Vec<StoreCall>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a raw payload in the store without recording a call.
    pub async fn seed(&self, key: &str, raw: &str) {
        self.inner.set(key, raw, Duration::from_secs(60)).await.unwrap();
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Option<StoreCall> {
        self.calls.lock().unwrap().last().cloned()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl KeyValueStore for RecordingStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.record(StoreCall::Get(key.to_string()));
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.record(StoreCall::Set {
            key: key.to_string(),
            value: value.to_string(),
            ttl,
        });
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        self.record(StoreCall::Delete(key.to_string()));
        self.inner.delete(key).await
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "recording"
    }
}

/// Store whose every operation fails, as if the server were unreachable.
#[derive(Default)]
pub struct FailingStore {
    calls: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> CacheResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Backend("connection refused".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        self.fail()
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        self.fail()
    }

    async fn delete(&self, _key: &str) -> CacheResult<bool> {
        self.fail()
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}
