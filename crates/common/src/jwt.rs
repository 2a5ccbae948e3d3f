//! JWT utilities shared across token signer components.
//!
//! - Size limit applied before any token parsing
//! - The fixed `nbf` grace window used when issuing tokens
//! - Key ID extraction from JWT headers, used by verifiers to resolve the
//!   public key record of the signing key
//!
//! # Usage
//!
//! ```rust,ignore
//! use common::jwt::extract_kid;
//!
//! let kid = extract_kid(&token)?;
//! let public_pem = key_store.read_public_key(&kid).await?;
//! ```

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// Tokens larger than this are rejected before base64 decoding or signature
/// verification. Role-composed claims are small; 8KB leaves room for large
/// `aud` arrays and operator-defined claims.
pub const MAX_JWT_SIZE_BYTES: usize = 8192; // 8KB

/// Grace window subtracted from `iat` to produce `nbf` (5 minutes).
///
/// Tolerates verifiers whose clocks run slightly behind the signer.
pub const NOT_BEFORE_GRACE: Duration = Duration::from_secs(300);

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while inspecting a JWT header.
///
/// Messages are intentionally generic; details are logged at debug level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds maximum allowed.
    #[error("The token is invalid")]
    TokenTooLarge,

    /// Token format is invalid (not a valid JWT structure).
    #[error("The token is invalid")]
    MalformedToken,

    /// Token is missing required `kid` header.
    #[error("The token is invalid")]
    MissingKid,
}

// =============================================================================
// Functions
// =============================================================================

/// Extract the `kid` (key ID) from a JWT header without verifying the signature.
///
/// The signer sets `kid` to the identifier of the key generation that
/// produced the signature. Verifiers use it to fetch `key/<kid>`; the token
/// MUST still be verified against that key afterwards.
///
/// # Errors
///
/// - `TokenTooLarge` - Token exceeds `MAX_JWT_SIZE_BYTES`
/// - `MalformedToken` - Wrong structure, bad base64, or invalid header JSON
/// - `MissingKid` - Header has no `kid`, or `kid` is empty or not a string
pub fn extract_kid(token: &str) -> Result<String, JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }

    let mut parts = token.split('.');
    let (Some(header_part), Some(_), Some(_), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        tracing::debug!(target: "common.jwt", "Token rejected: invalid JWT format");
        return Err(JwtValidationError::MalformedToken);
    };

    let header_bytes = URL_SAFE_NO_PAD.decode(header_part).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode JWT header base64");
        JwtValidationError::MalformedToken
    })?;

    let header: serde_json::Value = serde_json::from_slice(&header_bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to parse JWT header JSON");
        JwtValidationError::MalformedToken
    })?;

    header
        .get("kid")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or(JwtValidationError::MissingKid)
}
