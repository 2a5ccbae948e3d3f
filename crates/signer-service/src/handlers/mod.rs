//! HTTP request handlers for the token signer.
//!
//! Handlers are thin: they extract the request, call into `services`, and
//! let `SignerError` map failures to status codes.

use crate::errors::SignerError;
use axum::body::Bytes;
use serde::de::DeserializeOwned;

pub mod health;
pub mod key_handler;
pub mod metrics;
pub mod role_handler;
pub mod sign_handler;

pub use health::health_check;
pub use key_handler::read_key;
pub use metrics::metrics_handler;
pub use role_handler::{delete_role, list_roles, read_role, write_role};
pub use sign_handler::sign;

/// Decode a JSON body whose fields are all optional.
///
/// An empty body (with or without a content type) decodes to `T::default()`;
/// a malformed one is `InvalidInput` so the response keeps the error list
/// shape.
pub(crate) fn optional_json<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, SignerError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| SignerError::InvalidInput(format!("request body: {}", e)))
}
