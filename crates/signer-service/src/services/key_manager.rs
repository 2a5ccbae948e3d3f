//! Signing key lifecycle.
//!
//! The manager owns the single "current key" slot. Every sign request calls
//! [`KeyManager::get`], which returns the cached key while it is unexpired and
//! otherwise adopts a still-valid key from storage or generates a new one.
//!
//! # Locking
//!
//! Double-checked locking on a `tokio::sync::RwLock`:
//!
//! 1. Fast path: shared lock, return the cached key if valid.
//! 2. Slow path: exclusive lock, then re-check the cache. A caller queued on
//!    the exclusive lock must see the key the previous holder installed,
//!    otherwise every queued caller would generate its own key.
//! 3. Consult storage (another process sharing the store may have rotated).
//! 4. Generate, re-check storage once more, persist `privatekey` then
//!    `key/<id>`, and only then install the key in memory.
//!
//! Each [`SigningKey`] decodes its DER material on first use behind its own
//! lock, independent of the manager lock.

use crate::clock::Clock;
use crate::crypto;
use crate::errors::SignerError;
use crate::models::{PrivateKeyRecord, PublicKeyRecord, MAX_ROLE_TTL_SECONDS};
use crate::observability::metrics;
use crate::storage::{self, KeyValueStore, PRIVATE_KEY_PATH};
use chrono::{DateTime, Duration, Utc};
use common::error::StorageError;
use jsonwebtoken::EncodingKey;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

/// Lifetime of a signing key before rotation (1 day).
pub const KEY_LIFETIME_SECONDS: i64 = 86_400;

/// How long a public key record outlives its signing key.
///
/// Equal to the maximum role TTL, so a token signed just before rotation
/// stays verifiable until its own expiry.
pub const PUBLIC_KEY_GRACE_SECONDS: i64 = MAX_ROLE_TTL_SECONDS;

/// One generation of the signing key.
pub struct SigningKey {
    id: String,
    expires: DateTime<Utc>,
    der: Vec<u8>,
    decoded: std::sync::RwLock<Option<Arc<EncodingKey>>>,
}

impl SigningKey {
    fn from_record(record: PrivateKeyRecord) -> Self {
        Self {
            id: record.id,
            expires: record.expires,
            der: record.der,
            decoded: std::sync::RwLock::new(None),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn expires(&self) -> DateTime<Utc> {
        self.expires
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires > now
    }

    /// Decoded signing key, decoding the DER material on first call.
    pub fn encoding_key(&self) -> Result<Arc<EncodingKey>, SignerError> {
        {
            let decoded = self
                .decoded
                .read()
                .map_err(|_| SignerError::Internal("Signing key lock poisoned".to_string()))?;
            if let Some(key) = decoded.as_ref() {
                return Ok(Arc::clone(key));
            }
        }

        let mut decoded = self
            .decoded
            .write()
            .map_err(|_| SignerError::Internal("Signing key lock poisoned".to_string()))?;
        if let Some(key) = decoded.as_ref() {
            return Ok(Arc::clone(key));
        }

        let key = Arc::new(crypto::decode_private_key(&self.der).map_err(|e| {
            tracing::error!(target: "signer.keys", key_id = %self.id, "Persisted signing key failed to decode");
            e
        })?);
        *decoded = Some(Arc::clone(&key));
        Ok(key)
    }

    /// Sign a claims object with this key; `kid` is set to [`Self::id`].
    pub fn sign(&self, claims: &Map<String, Value>) -> Result<String, SignerError> {
        let encoding_key = self.encoding_key()?;
        crypto::sign_jwt(claims, &encoding_key, &self.id)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("id", &self.id)
            .field("expires", &self.expires)
            .field("der", &"[REDACTED]")
            .finish()
    }
}

/// Owner of the current signing key.
pub struct KeyManager {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    current: RwLock<Option<Arc<SigningKey>>>,
}

impl KeyManager {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            current: RwLock::new(None),
        }
    }

    /// Return a valid, decoded signing key, rotating if needed.
    ///
    /// # Errors
    ///
    /// - `SignerError::KeyCorrupt` - persisted key material does not decode
    /// - `SignerError::Storage` - the store failed
    /// - `SignerError::Crypto` - key generation failed
    #[instrument(skip_all)]
    pub async fn get(&self) -> Result<Arc<SigningKey>, SignerError> {
        {
            let current = self.current.read().await;
            if let Some(key) = valid(current.as_ref(), self.clock.now()) {
                key.encoding_key()?;
                return Ok(key);
            }
        }

        let mut current = self.current.write().await;

        // Re-check: another caller may have installed a key while we waited.
        if let Some(key) = valid(current.as_ref(), self.clock.now()) {
            key.encoding_key()?;
            return Ok(key);
        }

        if let Some(key) = self.load_persisted().await? {
            key.encoding_key()?;
            tracing::info!(target: "signer.keys", key_id = %key.id(), "Adopted persisted signing key");
            *current = Some(Arc::clone(&key));
            return Ok(key);
        }

        let key = self.rotate().await?;
        *current = Some(Arc::clone(&key));
        Ok(key)
    }

    /// Id of the key held in memory, if any. Does not touch storage.
    pub async fn current_key_id(&self) -> Option<String> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|key| key.id().to_string())
    }

    /// Load the persisted key if it is still valid.
    async fn load_persisted(&self) -> Result<Option<Arc<SigningKey>>, SignerError> {
        let record: Option<PrivateKeyRecord> =
            storage::get_json(self.store.as_ref(), PRIVATE_KEY_PATH)
                .await
                .map_err(|e| match e {
                    StorageError::Serialization(msg) => {
                        SignerError::KeyCorrupt(format!("Invalid private key record: {}", msg))
                    }
                    other => other.into(),
                })?;

        let now = self.clock.now();
        Ok(record
            .filter(|record| record.expires > now)
            .map(|record| Arc::new(SigningKey::from_record(record))))
    }

    /// Generate and persist a new key generation.
    #[instrument(skip_all)]
    async fn rotate(&self) -> Result<Arc<SigningKey>, SignerError> {
        let generated = tokio::task::spawn_blocking(crypto::generate_signing_key)
            .await
            .map_err(|e| SignerError::Internal(format!("Key generation task failed: {}", e)))?
            .map_err(|e| {
                metrics::record_key_generation("error");
                e
            })?;
        metrics::record_key_generation("success");

        // Another process sharing the store may have rotated while we generated.
        if let Some(key) = self.load_persisted().await? {
            key.encoding_key()?;
            tracing::info!(
                target: "signer.keys",
                key_id = %key.id(),
                "Discarding generated key, store already holds a valid one"
            );
            return Ok(key);
        }

        let now = self.clock.now();
        let expires = now + Duration::seconds(KEY_LIFETIME_SECONDS);
        let record = PrivateKeyRecord {
            id: Uuid::new_v4().to_string(),
            expires,
            der: generated.private_der,
        };
        let public = PublicKeyRecord {
            expires: Some(expires + Duration::seconds(PUBLIC_KEY_GRACE_SECONDS)),
            public_pem: generated.public_pem,
        };

        storage::put_json(self.store.as_ref(), PRIVATE_KEY_PATH, &record).await?;
        storage::put_json(self.store.as_ref(), &storage::key_path(&record.id), &public).await?;

        tracing::info!(
            target: "signer.keys",
            key_id = %record.id,
            expires = %expires,
            "Generated new signing key"
        );

        let key = Arc::new(SigningKey::from_record(record));
        key.encoding_key()?;
        Ok(key)
    }
}

fn valid(key: Option<&Arc<SigningKey>>, now: DateTime<Utc>) -> Option<Arc<SigningKey>> {
    key.filter(|key| key.is_valid_at(now)).map(Arc::clone)
}
