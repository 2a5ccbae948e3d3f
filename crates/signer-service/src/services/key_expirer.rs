//! Pruning of expired public key records.
//!
//! Public key records (`key/<id>`) outlive their signing key so verifiers can
//! check tokens issued just before a rotation. Once a record's own expiry has
//! passed it is deleted. Records without an expiry never expire, and the
//! record of the key currently held by the [`KeyManager`] is never deleted.

use crate::errors::SignerError;
use crate::models::PublicKeyRecord;
use crate::observability::metrics;
use crate::services::key_manager::KeyManager;
use crate::storage::{self, KeyValueStore, KEY_PREFIX};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::instrument;

pub struct KeyExpirer {
    store: Arc<dyn KeyValueStore>,
    key_manager: Arc<KeyManager>,
}

impl KeyExpirer {
    pub fn new(store: Arc<dyn KeyValueStore>, key_manager: Arc<KeyManager>) -> Self {
        Self { store, key_manager }
    }

    /// Delete public key records whose expiry is strictly before `now`.
    ///
    /// Returns the number of records deleted. The first storage failure
    /// aborts the sweep; records already deleted stay deleted.
    #[instrument(skip_all, fields(now = %now))]
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<u64, SignerError> {
        let current = self.key_manager.current_key_id().await;
        let key_ids = self.store.list(KEY_PREFIX).await?;

        let mut deleted = 0u64;
        for key_id in key_ids {
            if current.as_deref() == Some(key_id.as_str()) {
                continue;
            }

            let path = storage::key_path(&key_id);
            let Some(record) = storage::get_json::<PublicKeyRecord, _>(self.store.as_ref(), &path).await?
            else {
                continue;
            };

            match record.expires {
                Some(expires) if expires < now => {
                    self.store.delete(&path).await?;
                    deleted += 1;
                    tracing::info!(
                        target: "signer.keys",
                        key_id = %key_id,
                        expired_at = %expires,
                        "Deleted expired public key"
                    );
                }
                _ => {}
            }
        }

        metrics::record_keys_swept(deleted);
        Ok(deleted)
    }
}
