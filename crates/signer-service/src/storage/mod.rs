//! Key-value persistence boundary.
//!
//! The signer persists three kinds of records, all JSON-encoded:
//!
//! - `privatekey` - the current signing key (single slot, sealed at rest)
//! - `key/<id>` - public key of every key generation, until swept
//! - `role/<name>` - role policy
//!
//! Each operation on a [`KeyValueStore`] is individually atomic; there are no
//! multi-key transactions.

pub mod memory;
pub mod sealed;

pub use memory::InMemoryStore;
pub use sealed::SealedStore;

use async_trait::async_trait;
use common::error::StorageResult;
use serde::{de::DeserializeOwned, Serialize};

/// Storage slot holding the current private key.
pub const PRIVATE_KEY_PATH: &str = "privatekey";

/// Prefix of per-generation public key records.
pub const KEY_PREFIX: &str = "key/";

/// Prefix of role records.
pub const ROLE_PREFIX: &str = "role/";

pub fn key_path(key_id: &str) -> String {
    format!("{}{}", KEY_PREFIX, key_id)
}

pub fn role_path(name: &str) -> String {
    format!("{}{}", ROLE_PREFIX, name)
}

/// Externally supplied key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    async fn put(&self, key: &str, value: Vec<u8>) -> StorageResult<()>;

    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Names directly beneath `prefix`, sorted, with the prefix stripped.
    ///
    /// Deeper entries collapse to their first segment followed by `/`.
    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;
}

/// Read and decode a JSON record.
pub async fn get_json<T, S>(store: &S, key: &str) -> StorageResult<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Encode and write a JSON record.
pub async fn put_json<T, S>(store: &S, key: &str, value: &T) -> StorageResult<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let bytes = serde_json::to_vec(value)?;
    store.put(key, bytes).await
}

/// Collapse a full key into its listing name relative to `prefix`.
pub(crate) fn list_name(prefix: &str, key: &str) -> Option<String> {
    let rest = key.strip_prefix(prefix)?;
    if rest.is_empty() {
        return None;
    }
    match rest.find('/') {
        Some(idx) => rest.get(..=idx).map(ToString::to_string),
        None => Some(rest.to_string()),
    }
}
