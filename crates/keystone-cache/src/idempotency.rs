//! Request idempotency guard.
//!
//! A processed request is remembered under
//! `IDPT:<user id>:<endpoint>:<payload fingerprint>` together with the
//! response that was returned for it. A repeated request with the same
//! payload finds the marker and can replay the response instead of running
//! the operation again.
//!
//! ```rust,ignore
//! let guard = IdempotencyGuard::new(cache.clone());
//!
//! if let Some(previous) = guard.check::<_, DepositResponse>(&user_id, "/api/account/deposit", &request).await? {
//!     return Ok(previous);
//! }
//!
//! let response = deposit(&request).await?;
//! // A failed record is returned: the caller must not report the request as guarded.
//! guard.record(&user_id, "/api/account/deposit", &request, &response).await?;
//! ```

use crate::category::CacheCategory;
use crate::client::CacheClient;
use crate::error::CacheResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::info;

/// Lowercase hex SHA-256 of the payload's JSON serialization.
///
/// Payloads must serialize deterministically (structs and
/// `serde_json::Value` do; `HashMap` does not).
pub fn fingerprint<P>(payload: &P) -> CacheResult<String>
where
    P: Serialize + ?Sized,
{
    let bytes = serde_json::to_vec(payload)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Detects and records duplicate requests.
///
/// The payload part of the key is a fixed-length hex digest, but the user id
/// and endpoint are used as given. A user id containing `:` can therefore
/// produce the same key as a different user id and endpoint pair; use ids
/// without `:` or pass an already-hashed id.
#[derive(Clone)]
pub struct IdempotencyGuard {
    cache: CacheClient,
    ttl: Duration,
}

impl IdempotencyGuard {
    const CATEGORY: CacheCategory = CacheCategory::Idempotency;

    /// Create a guard that keeps markers for the category's default TTL.
    #[must_use]
    pub fn new(cache: CacheClient) -> Self {
        Self {
            cache,
            ttl: Self::CATEGORY.default_ttl(),
        }
    }

    /// Create a guard with a custom marker TTL.
    #[must_use]
    pub fn with_ttl(cache: CacheClient, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Marker TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the response recorded for an identical earlier request.
    pub async fn check<P, R>(&self, user_id: &str, endpoint: &str, payload: &P) -> CacheResult<Option<R>>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let hash = fingerprint(payload)?;
        self.cache.get_as(Self::CATEGORY, &[user_id, endpoint, hash.as_str()]).await
    }

    /// Returns true if an identical request was already recorded.
    pub async fn is_duplicate<P>(&self, user_id: &str, endpoint: &str, payload: &P) -> CacheResult<bool>
    where
        P: Serialize + ?Sized,
    {
        let hash = fingerprint(payload)?;
        self.cache.exists(Self::CATEGORY, &[user_id, endpoint, hash.as_str()]).await
    }

    /// Record that the request was processed and produced `response`.
    ///
    /// Store failures are returned.
    pub async fn record<P, R>(&self, user_id: &str, endpoint: &str, payload: &P, response: &R) -> CacheResult<()>
    where
        P: Serialize + ?Sized,
        R: Serialize + ?Sized,
    {
        let hash = fingerprint(payload)?;
        self.cache
            .put_with_ttl(Self::CATEGORY, response, self.ttl, &[user_id, endpoint, hash.as_str()])
            .await?;
        info!(user_id, endpoint, ttl_secs = self.ttl.as_secs(), "Idempotency marker recorded");
        Ok(())
    }

    /// Forget a recorded request so it can be processed again.
    pub async fn release<P>(&self, user_id: &str, endpoint: &str, payload: &P) -> CacheResult<()>
    where
        P: Serialize + ?Sized,
    {
        let hash = fingerprint(payload)?;
        self.cache.delete(Self::CATEGORY, &[user_id, endpoint, hash.as_str()]).await
    }
}
