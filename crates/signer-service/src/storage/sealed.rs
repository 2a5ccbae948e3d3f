//! Encryption-at-rest wrapper for sensitive storage slots.

use super::{KeyValueStore, PRIVATE_KEY_PATH};
use crate::crypto;
use async_trait::async_trait;
use common::error::{StorageError, StorageResult};
use common::secret::{ExposeSecret, SecretBox};
use std::collections::HashSet;

/// Wraps a store and AES-256-GCM seals the values of selected keys.
///
/// Keys outside the sealed set pass through untouched, so public key and
/// role records stay readable by other consumers of the store.
pub struct SealedStore<S> {
    inner: S,
    master_key: SecretBox<Vec<u8>>,
    sealed_paths: HashSet<String>,
}

impl<S: KeyValueStore> SealedStore<S> {
    /// Seal the `privatekey` slot of `inner`.
    pub fn new(inner: S, master_key: SecretBox<Vec<u8>>) -> Self {
        Self::with_paths(inner, master_key, [PRIVATE_KEY_PATH])
    }

    pub fn with_paths<I, P>(inner: S, master_key: SecretBox<Vec<u8>>, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            inner,
            master_key,
            sealed_paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn is_sealed(&self, key: &str) -> bool {
        self.sealed_paths.contains(key)
    }
}

#[async_trait]
impl<S: KeyValueStore> KeyValueStore for SealedStore<S> {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let Some(stored) = self.inner.get(key).await? else {
            return Ok(None);
        };

        if !self.is_sealed(key) {
            return Ok(Some(stored));
        }

        crypto::unseal(&stored, self.master_key.expose_secret())
            .map(Some)
            .map_err(|e| {
                tracing::error!(target: "signer.storage", key = %key, "Failed to unseal entry");
                StorageError::Seal(e.to_string())
            })
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> StorageResult<()> {
        let value = if self.is_sealed(key) {
            crypto::seal(&value, self.master_key.expose_secret())
                .map_err(|e| StorageError::Seal(e.to_string()))?
        } else {
            value
        };
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key).await
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.inner.list(prefix).await
    }
}
