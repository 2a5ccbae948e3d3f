//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for issued tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: String,
    #[serde(default)]
    pub kid: Option<String>,
}

fn decode_part(token: &str, index: usize) -> Value {
    let parts: Vec<_> = token.split('.').collect();
    assert_eq!(
        parts.len(),
        3,
        "JWT must have 3 parts (header.payload.signature), got {}",
        parts.len()
    );
    let bytes = URL_SAFE_NO_PAD
        .decode(parts[index])
        .expect("JWT part should be base64url");
    serde_json::from_slice(&bytes).expect("JWT part should be JSON")
}

/// Decode the payload of a JWT without verifying its signature.
pub fn decode_payload(token: &str) -> Value {
    decode_part(token, 1)
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_signed_by(&kid)
///     .assert_claim("aud", json!("billing"))
///     .assert_lifetime(600);
/// ```
pub trait TokenAssertions {
    /// Assert the token is a three-part RS256 JWT with a key id
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert the token header names `key_id`
    fn assert_signed_by(&self, key_id: &str) -> &Self;

    /// Assert a payload claim equals `expected`
    fn assert_claim(&self, name: &str, expected: Value) -> &Self;

    /// Assert a payload claim is absent
    fn assert_no_claim(&self, name: &str) -> &Self;

    /// Assert `exp - iat == seconds` and `nbf` sits five minutes before `iat`
    fn assert_lifetime(&self, seconds: i64) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let header: JwtHeader = serde_json::from_value(decode_part(self, 0))
            .expect("JWT header should have alg and typ");
        assert_eq!(header.alg, "RS256", "Expected RS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");
        assert!(
            header.kid.as_deref().is_some_and(|kid| !kid.is_empty()),
            "JWT header should carry a kid"
        );
        self
    }

    fn assert_signed_by(&self, key_id: &str) -> &Self {
        let header: JwtHeader = serde_json::from_value(decode_part(self, 0))
            .expect("JWT header should have alg and typ");
        assert_eq!(
            header.kid.as_deref(),
            Some(key_id),
            "Token signed by unexpected key"
        );
        self
    }

    fn assert_claim(&self, name: &str, expected: Value) -> &Self {
        let payload = decode_payload(self);
        assert_eq!(
            payload.get(name),
            Some(&expected),
            "Claim {} mismatch in {}",
            name,
            payload
        );
        self
    }

    fn assert_no_claim(&self, name: &str) -> &Self {
        let payload = decode_payload(self);
        assert!(
            payload.get(name).is_none(),
            "Claim {} should be absent in {}",
            name,
            payload
        );
        self
    }

    fn assert_lifetime(&self, seconds: i64) -> &Self {
        let payload = decode_payload(self);
        let iat = payload["iat"].as_i64().expect("iat should be an integer");
        let exp = payload["exp"].as_i64().expect("exp should be an integer");
        let nbf = payload["nbf"].as_i64().expect("nbf should be an integer");
        assert_eq!(exp - iat, seconds, "Unexpected token lifetime");
        assert_eq!(iat - nbf, 300, "nbf should be five minutes before iat");
        self
    }
}
