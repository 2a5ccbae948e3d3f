//! Chaos tests for concurrent first use of the key manager
//!
//! Many sign requests arriving before any key exists must converge on a
//! single generated key. The counting store delays each write to widen the
//! window between "no key cached" and "key persisted".

use signer_service::clock::SystemClock;
use signer_service::services::KeyManager;
use signer_service::storage::{KEY_PREFIX, PRIVATE_KEY_PATH};
use signer_test_utils::CountingStore;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

const CONCURRENT_CALLERS: usize = 16;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_get_generates_exactly_one_key() -> Result<(), anyhow::Error> {
    // Arrange
    let store = Arc::new(CountingStore::with_put_delay(Duration::from_millis(20)));
    let manager = Arc::new(KeyManager::new(store.clone(), Arc::new(SystemClock)));

    // Act
    let mut handles = Vec::with_capacity(CONCURRENT_CALLERS);
    for _ in 0..CONCURRENT_CALLERS {
        let manager = Arc::clone(&manager);
        handles.push(tokio::spawn(async move {
            manager.get().await.map(|key| key.id().to_string())
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await??);
    }

    // Assert
    assert_eq!(ids.len(), 1, "All callers must receive the same key");
    assert_eq!(store.put_count(PRIVATE_KEY_PATH), 1);
    assert_eq!(store.put_count_with_prefix(KEY_PREFIX), 1);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_managers_sharing_a_store_adopt_the_same_key() -> Result<(), anyhow::Error> {
    let store = Arc::new(CountingStore::new());
    let first = KeyManager::new(store.clone(), Arc::new(SystemClock));
    let second = KeyManager::new(store.clone(), Arc::new(SystemClock));

    let a = first.get().await?;
    let b = second.get().await?;

    assert_eq!(a.id(), b.id());
    assert_eq!(store.put_count(PRIVATE_KEY_PATH), 1);

    Ok(())
}
