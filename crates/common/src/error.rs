//! Common error types for token signer components.

use thiserror::Error;

/// Errors raised by the key-value persistence boundary.
///
/// Every storage implementation (in-memory, sealed, or an external store)
/// reports failures through this type so the service layer can treat them
/// uniformly as opaque storage failures.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend get/put/delete/list failed
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Stored record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Sealed entry could not be sealed or unsealed
    #[error("Seal error: {0}")]
    Seal(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias using `StorageError`
pub type StorageResult<T> = std::result::Result<T, StorageError>;
