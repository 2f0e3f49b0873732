//! # Keystone Cache
//!
//! Typed key-value caching for request idempotency and short-lived
//! computed values.
//!
//! - [`CacheCategory`] is the closed set of key categories. Each one fixes a
//!   key template such as `IDPT:%s:%s:%s`, a default TTL and a value encoding.
//! - [`CacheClient`] renders keys and runs `exists`/`get`/`get_as`/`put`/
//!   `put_with_ttl`/`delete` against a [`KeyValueStore`]. Reads and deletes
//!   survive store outages, writes report them.
//! - [`IdempotencyGuard`] builds on the client to detect repeated requests.
//!
//! ```rust,ignore
//! let cache = keystone_cache::build_cache_client(&config).await?;
//! let args = ["user123", "/api/account/deposit", "payload123"];
//!
//! cache.put(CacheCategory::Idempotency, &response, &args).await?;
//! assert!(cache.exists(CacheCategory::Idempotency, &args).await?);
//! ```

pub mod category;
pub mod client;
pub mod di;
pub mod error;
pub mod idempotency;
pub mod metrics;
pub mod store;

pub use category::{CacheCategory, CategoryDescriptor, ValueEncoding};
pub use client::CacheClient;
pub use di::{build_cache_client, build_cache_module, build_store, CacheModule};
pub use error::{CacheError, CacheResult};
pub use idempotency::{fingerprint, IdempotencyGuard};
pub use metrics::{register_metrics, CacheMetrics};
pub use store::{create_pool, KeyValueStore, MemoryStore, RedisStore};
