//! In-process key-value store.

use super::{list_name, KeyValueStore};
use async_trait::async_trait;
use common::error::StorageResult;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

/// `BTreeMap`-backed store. Used by the binary when no external store is
/// wired in, and throughout the tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> StorageResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let entries = self.entries.read().await;
        let names: BTreeSet<String> = entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .filter_map(|(k, _)| list_name(prefix, k))
            .collect();
        Ok(names.into_iter().collect())
    }
}
