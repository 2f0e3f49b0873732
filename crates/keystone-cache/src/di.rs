//! Dependency injection for the cache client.
//!
//! The store handle is built once from configuration and passed to the
//! [`CacheClient`]; consumers receive the client (or clones of it) rather
//! than reaching for a global.

use crate::client::CacheClient;
use crate::error::CacheResult;
use crate::store::{create_pool, KeyValueStore, MemoryStore, RedisStore, RedisStoreParameters};
use keystone_config::{AppConfig, StoreBackend};
use shaku::{module, HasComponent};
use std::sync::Arc;
use tracing::info;

// Cache module with the Redis-backed store.
module! {
    pub CacheModule {
        components = [RedisStore],
        providers = [],
    }
}

/// Builds the cache module around an optional Redis pool.
///
/// `None` yields a disabled store.
pub fn build_cache_module(pool: Option<Arc<deadpool_redis::Pool>>) -> Arc<CacheModule> {
    let module = CacheModule::builder()
        .with_component_parameters::<RedisStore>(RedisStoreParameters { pool })
        .build();
    Arc::new(module)
}

/// Builds the key-value store selected by `config`.
pub async fn build_store(config: &AppConfig) -> CacheResult<Arc<dyn KeyValueStore>> {
    let backend = config.store_backend();
    info!(backend = %backend, "Building cache store");

    let store: Arc<dyn KeyValueStore> = match backend {
        StoreBackend::Redis => {
            let pool = create_pool(&config.redis).await?;
            build_cache_module(Some(Arc::new(pool))).resolve()
        }
        StoreBackend::Disabled => build_cache_module(None).resolve(),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };

    Ok(store)
}

/// Builds a cache client for the store selected by `config`.
pub async fn build_cache_client(config: &AppConfig) -> CacheResult<CacheClient> {
    Ok(CacheClient::new(build_store(config).await?))
}
