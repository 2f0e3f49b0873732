//! Redis-backed key-value store.

use super::KeyValueStore;
use crate::error::{CacheError, CacheResult};
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Config, Pool, Runtime};
use keystone_config::RedisConfig;
use shaku::Component;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Create a Redis connection pool and check it with a `PING`.
pub async fn create_pool(config: &RedisConfig) -> CacheResult<Pool> {
    info!(url = %config.url, pool_size = config.pool_size, "Creating Redis connection pool");

    let pool = Config::from_url(&config.url)
        .builder()
        .map_err(|e| CacheError::Backend(format!("Invalid Redis config: {}", e)))?
        .max_size(config.pool_size)
        .wait_timeout(Some(config.connect_timeout()))
        .create_timeout(Some(config.connect_timeout()))
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| CacheError::Backend(format!("Failed to create Redis pool: {}", e)))?;

    let mut conn = pool.get().await?;
    let _: String = deadpool_redis::redis::cmd("PING").query_async(&mut conn).await?;

    info!("Redis connection pool created successfully");

    Ok(pool)
}

/// Redis-based key-value store.
///
/// Without a pool the store is disabled: reads miss, deletes are no-ops and
/// writes fail with [`CacheError::Disabled`] so that callers never assume an
/// entry was stored.
#[derive(Component)]
#[shaku(interface = KeyValueStore)]
pub struct RedisStore {
    /// Redis connection pool.
    pool: Option<Arc<Pool>>,
}

impl RedisStore {
    /// Create a new Redis store.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool: Some(pool) }
    }

    /// Create a disabled store (for when Redis is turned off).
    #[must_use]
    pub fn disabled() -> Self {
        Self { pool: None }
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> CacheResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => Ok(pool.get().await?),
            None => Err(CacheError::Disabled),
        }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let mut conn = self.get_conn().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.get_conn().await?;
        let ttl_secs = ttl.as_secs().max(1);

        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;

        debug!(key, ttl_secs, "SET EX");
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        if !self.is_enabled() {
            return Ok(false);
        }

        let mut conn = self.get_conn().await?;
        let deleted: i64 = conn.del(key).await?;
        Ok(deleted > 0)
    }

    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
