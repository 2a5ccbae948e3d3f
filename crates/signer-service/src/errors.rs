use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::error::StorageError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Validation failures collected across a single call.
///
/// Messages are kept lexicographically sorted so the reported order does not
/// depend on schema evaluation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn new(mut messages: Vec<String>) -> Self {
        messages.sort();
        Self(messages)
    }

    pub fn single(message: impl Into<String>) -> Self {
        Self(vec![message.into()])
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn into_messages(self) -> Vec<String> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [only] => write!(f, "1 error occurred: {}", only),
            all => write!(f, "{} errors occurred: {}", all.len(), all.join("; ")),
        }
    }
}

#[derive(Debug, Error)]
pub enum SignerError {
    /// Claims, defaults, overrides or schema are not valid JSON.
    #[error("Malformed input: {0}")]
    InvalidInput(String),

    /// One or more schema rules rejected the input.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// Sign request referenced a role that does not exist.
    #[error("no such role")]
    RoleNotFound,

    /// Plain read of an absent role or key.
    #[error("Not found")]
    NotFound,

    /// Persisted private key could not be decoded.
    #[error("Signing key material is corrupt: {0}")]
    KeyCorrupt(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<StorageError> for SignerError {
    fn from(err: StorageError) -> Self {
        SignerError::Storage(err.to_string())
    }
}

impl From<ValidationErrors> for SignerError {
    fn from(errors: ValidationErrors) -> Self {
        SignerError::Validation(errors)
    }
}

/// Error body: a machine-readable list of error strings.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    errors: Vec<String>,
}

impl IntoResponse for SignerError {
    fn into_response(self) -> Response {
        let (status, errors) = match self {
            SignerError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, vec![msg]),
            SignerError::Validation(errors) => (StatusCode::BAD_REQUEST, errors.into_messages()),
            SignerError::RoleNotFound => {
                (StatusCode::NOT_FOUND, vec!["no such role".to_string()])
            }
            SignerError::NotFound => (StatusCode::NOT_FOUND, vec![]),
            SignerError::KeyCorrupt(detail)
            | SignerError::Storage(detail)
            | SignerError::Crypto(detail)
            | SignerError::Internal(detail) => {
                tracing::error!(target: "signer.errors", error = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    vec!["An internal error occurred".to_string()],
                )
            }
        };

        (status, Json(ErrorResponse { errors })).into_response()
    }
}
