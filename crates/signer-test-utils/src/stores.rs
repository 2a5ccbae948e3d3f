//! Instrumented key-value stores.

use async_trait::async_trait;
use common::error::{StorageError, StorageResult};
use signer_service::storage::{InMemoryStore, KeyValueStore};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// In-memory store that counts writes per key.
///
/// An optional put delay widens race windows in concurrency tests.
#[derive(Default)]
pub struct CountingStore {
    inner: InMemoryStore,
    puts: Mutex<HashMap<String, usize>>,
    put_delay: Option<Duration>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_put_delay(delay: Duration) -> Self {
        Self {
            put_delay: Some(delay),
            ..Self::default()
        }
    }

    /// Number of puts to exactly `key`.
    pub fn put_count(&self, key: &str) -> usize {
        self.puts.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    /// Number of puts to keys starting with `prefix`.
    pub fn put_count_with_prefix(&self, prefix: &str) -> usize {
        self.puts
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(_, count)| count)
            .sum()
    }
}

#[async_trait]
impl KeyValueStore for CountingStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> StorageResult<()> {
        if let Some(delay) = self.put_delay {
            tokio::time::sleep(delay).await;
        }
        *self.puts.lock().unwrap().entry(key.to_string()).or_insert(0) += 1;
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key).await
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.inner.list(prefix).await
    }
}

/// Store whose every operation fails with a backend error.
#[derive(Debug, Default)]
pub struct FailingStore;

fn unavailable() -> StorageError {
    StorageError::Backend("store unavailable".to_string())
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> StorageResult<Option<Vec<u8>>> {
        Err(unavailable())
    }

    async fn put(&self, _key: &str, _value: Vec<u8>) -> StorageResult<()> {
        Err(unavailable())
    }

    async fn delete(&self, _key: &str) -> StorageResult<()> {
        Err(unavailable())
    }

    async fn list(&self, _prefix: &str) -> StorageResult<Vec<String>> {
        Err(unavailable())
    }
}
