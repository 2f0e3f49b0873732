//! Cache client behaviour against in-memory, recording and failing stores.

mod common;

use common::{FailingStore, RecordingStore, StoreCall};
use keystone_cache::{CacheCategory, CacheClient, CacheError, MemoryStore};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

const IDEMPOTENCY: CacheCategory = CacheCategory::Idempotency;
const ARGS: [&str; 3] = ["user123", "/api/account/deposit", "payload123"];
const KEY: &str = "IDPT:user123:/api/account/deposit:payload123";

fn recording_client() -> (CacheClient, Arc<RecordingStore>) {
    let store = Arc::new(RecordingStore::new());
    (CacheClient::new(store.clone()), store)
}

fn failing_client() -> (CacheClient, Arc<FailingStore>) {
    let store = Arc::new(FailingStore::new());
    (CacheClient::new(store.clone()), store)
}

#[tokio::test]
async fn test_put_uses_rendered_key_and_default_ttl() {
    let (cache, store) = recording_client();

    assert_ok!(cache.put(IDEMPOTENCY, "test-value", &ARGS).await);

    assert_eq!(
        store.last_call(),
        Some(StoreCall::Set {
            key: KEY.to_string(),
            value: "\"test-value\"".to_string(),
            ttl: Duration::from_secs(86_400),
        })
    );
}

#[tokio::test]
async fn test_put_with_ttl_overrides_default() {
    let (cache, store) = recording_client();

    assert_ok!(
        cache
            .put_with_ttl(IDEMPOTENCY, "test-value", Duration::from_secs(3600), &ARGS)
            .await
    );

    match store.last_call() {
        Some(StoreCall::Set { key, ttl, .. }) => {
            assert_eq!(key, KEY);
            assert_eq!(ttl, Duration::from_secs(3600));
        }
        other => panic!("expected a set call, got {other:?}"),
    }
}

#[tokio::test]
async fn test_put_rejects_fractional_ttl_without_writing() {
    let (cache, store) = recording_client();

    let err = assert_err!(
        cache
            .put_with_ttl(IDEMPOTENCY, "v", Duration::from_millis(2_750), &ARGS)
            .await
    );

    assert!(matches!(err, CacheError::InvalidTtl(_)));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_get_returns_stored_text() {
    let cache = CacheClient::new(Arc::new(MemoryStore::new()));

    assert_ok!(cache.put(IDEMPOTENCY, "test-value", &ARGS).await);

    let value = assert_ok!(cache.get(IDEMPOTENCY, &ARGS).await);
    assert_eq!(value, Some("test-value".to_string()));

    let typed = assert_ok!(cache.get_as::<String>(IDEMPOTENCY, &ARGS).await);
    assert_eq!(typed, Some("test-value".to_string()));
}

#[tokio::test]
async fn test_get_missing_key_is_none() {
    let (cache, store) = recording_client();

    let value = assert_ok!(cache.get(IDEMPOTENCY, &ARGS).await);
    assert_eq!(value, None);
    assert_eq!(store.calls(), vec![StoreCall::Get(KEY.to_string())]);
}

#[tokio::test]
async fn test_exists_follows_put_and_delete() {
    let cache = CacheClient::new(Arc::new(MemoryStore::new()));

    assert!(!assert_ok!(cache.exists(IDEMPOTENCY, &ARGS).await));

    assert_ok!(cache.put(IDEMPOTENCY, "test-value", &ARGS).await);
    assert!(assert_ok!(cache.exists(IDEMPOTENCY, &ARGS).await));

    assert_ok!(cache.delete(IDEMPOTENCY, &ARGS).await);
    assert!(!assert_ok!(cache.exists(IDEMPOTENCY, &ARGS).await));
    assert_eq!(assert_ok!(cache.get(IDEMPOTENCY, &ARGS).await), None);
}

#[tokio::test]
async fn test_delete_sends_rendered_key() {
    let (cache, store) = recording_client();

    assert_ok!(cache.delete(IDEMPOTENCY, &ARGS).await);

    assert_eq!(store.calls(), vec![StoreCall::Delete(KEY.to_string())]);
}

#[tokio::test]
async fn test_delete_missing_key_succeeds() {
    let cache = CacheClient::new(Arc::new(MemoryStore::new()));
    assert_ok!(cache.delete(IDEMPOTENCY, &ARGS).await);
}

#[tokio::test]
async fn test_typed_get_mismatch_is_a_miss() {
    let (cache, store) = recording_client();
    store.seed(KEY, "123").await;

    let typed = assert_ok!(cache.get_as::<String>(IDEMPOTENCY, &ARGS).await);
    assert_eq!(typed, None);

    let raw = assert_ok!(cache.get(IDEMPOTENCY, &ARGS).await);
    assert_eq!(raw, Some("123".to_string()));

    let number = assert_ok!(cache.get_as::<i64>(IDEMPOTENCY, &ARGS).await);
    assert_eq!(number, Some(123));
}

#[tokio::test]
async fn test_structured_value_round_trip() {
    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct DepositResponse {
        transaction_id: String,
        amount: u64,
    }

    let cache = CacheClient::new(Arc::new(MemoryStore::new()));
    let response = DepositResponse {
        transaction_id: "tx-42".to_string(),
        amount: 100,
    };

    assert_ok!(cache.put(IDEMPOTENCY, &response, &ARGS).await);

    let cached = assert_ok!(cache.get_as::<DepositResponse>(IDEMPOTENCY, &ARGS).await);
    assert_eq!(cached, Some(response));

    let raw = assert_ok!(cache.get(IDEMPOTENCY, &ARGS).await);
    assert_eq!(raw, Some("{\"transaction_id\":\"tx-42\",\"amount\":100}".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_entry_expires_after_ttl() {
    let cache = CacheClient::new(Arc::new(MemoryStore::new()));

    assert_ok!(
        cache
            .put_with_ttl(IDEMPOTENCY, "test-value", Duration::from_secs(60), &ARGS)
            .await
    );

    tokio::time::advance(Duration::from_secs(59)).await;
    assert!(assert_ok!(cache.exists(IDEMPOTENCY, &ARGS).await));

    tokio::time::advance(Duration::from_secs(1)).await;
    assert!(!assert_ok!(cache.exists(IDEMPOTENCY, &ARGS).await));
    assert_eq!(assert_ok!(cache.get(IDEMPOTENCY, &ARGS).await), None);
}

#[tokio::test(start_paused = true)]
async fn test_default_ttl_entry_expires_after_a_day() {
    let cache = CacheClient::new(Arc::new(MemoryStore::new()));

    assert_ok!(cache.put(IDEMPOTENCY, "test-value", &ARGS).await);

    tokio::time::advance(Duration::from_secs(86_399)).await;
    assert_eq!(
        assert_ok!(cache.get(IDEMPOTENCY, &ARGS).await),
        Some("test-value".to_string())
    );

    tokio::time::advance(Duration::from_secs(1)).await;
    assert_eq!(assert_ok!(cache.get(IDEMPOTENCY, &ARGS).await), None);
    assert!(!assert_ok!(cache.exists(IDEMPOTENCY, &ARGS).await));
}

#[tokio::test]
async fn test_put_overwrites_previous_value() {
    let cache = CacheClient::new(Arc::new(MemoryStore::new()));

    assert_ok!(cache.put(IDEMPOTENCY, "first", &ARGS).await);
    assert_ok!(cache.put(IDEMPOTENCY, "second", &ARGS).await);

    assert_eq!(
        assert_ok!(cache.get(IDEMPOTENCY, &ARGS).await),
        Some("second".to_string())
    );
}

#[tokio::test]
async fn test_reads_and_deletes_survive_store_failure() {
    let (cache, store) = failing_client();

    assert_eq!(assert_ok!(cache.get(IDEMPOTENCY, &ARGS).await), None);
    assert_eq!(assert_ok!(cache.get_as::<String>(IDEMPOTENCY, &ARGS).await), None);
    assert!(!assert_ok!(cache.exists(IDEMPOTENCY, &ARGS).await));
    assert_ok!(cache.delete(IDEMPOTENCY, &ARGS).await);

    assert_eq!(store.call_count(), 4);
}

#[tokio::test]
async fn test_write_surfaces_store_failure() {
    let (cache, store) = failing_client();

    let err = assert_err!(cache.put(IDEMPOTENCY, "test-value", &ARGS).await);
    assert!(matches!(err, CacheError::Backend(_)));
    assert!(!err.is_contract_violation());

    let err = assert_err!(
        cache
            .put_with_ttl(IDEMPOTENCY, "test-value", Duration::from_secs(3600), &ARGS)
            .await
    );
    assert!(matches!(err, CacheError::Backend(_)));

    assert_eq!(store.call_count(), 2);
}

#[tokio::test]
async fn test_contract_violations_are_surfaced_before_store_access() {
    let (cache, store) = failing_client();

    let err = assert_err!(cache.get(IDEMPOTENCY, &["user123", "/api/account/deposit"]).await);
    assert!(matches!(
        err,
        CacheError::ArityMismatch {
            expected: 3,
            actual: 2,
            ..
        }
    ));

    let err = assert_err!(cache.exists(IDEMPOTENCY, &["user123", "", "payload123"]).await);
    assert!(matches!(err, CacheError::BlankArgument { index: 1, .. }));

    let err = assert_err!(cache.delete(IDEMPOTENCY, &["user123", "  ", "payload123"]).await);
    assert!(err.is_contract_violation());

    let err = assert_err!(cache.put(IDEMPOTENCY, "v", &["a", "b", "c", "d"]).await);
    assert!(matches!(err, CacheError::ArityMismatch { actual: 4, .. }));

    let err = assert_err!(
        cache
            .put_with_ttl(IDEMPOTENCY, "v", Duration::ZERO, &ARGS)
            .await
    );
    assert!(matches!(err, CacheError::InvalidTtl(_)));

    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn test_static_key_uses_template_verbatim() {
    let (cache, store) = recording_client();

    assert_ok!(cache.put(IDEMPOTENCY, "v", &[]).await);

    match store.last_call() {
        Some(StoreCall::Set { key, .. }) => assert_eq!(key, "IDPT:%s:%s:%s"),
        other => panic!("expected a set call, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_clients_share_store() {
    let cache = CacheClient::new(Arc::new(MemoryStore::new()));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let cache = cache.clone();
            tokio::spawn(async move {
                let user = format!("user{i}");
                let args = [user.as_str(), "/api/account/deposit", "payload123"];
                cache.put(IDEMPOTENCY, &i, &args).await?;
                cache.get_as::<i32>(IDEMPOTENCY, &args).await
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let value = handle.await.unwrap().unwrap();
        assert_eq!(value, Some(i32::try_from(i).unwrap()));
    }

    for i in 0..16 {
        let user = format!("user{i}");
        let args = [user.as_str(), "/api/account/deposit", "payload123"];
        assert!(cache.exists(IDEMPOTENCY, &args).await.unwrap());
    }
}
