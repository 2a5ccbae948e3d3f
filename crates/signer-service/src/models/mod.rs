use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Default role token lifetime (1 hour).
pub const DEFAULT_ROLE_TTL_SECONDS: i64 = 3600;

/// Maximum role token lifetime (24 hours).
pub const MAX_ROLE_TTL_SECONDS: i64 = 86_400;

/// Role policy (stored at `role/<name>`).
///
/// `defaults`, `overrides` and `schema` hold JSON documents exactly as the
/// operator submitted them; an empty string means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(default)]
    pub defaults: String,
    #[serde(default)]
    pub overrides: String,
    #[serde(default)]
    pub schema: String,
    #[serde(default = "default_ttl")]
    pub ttl: i64,
}

fn default_ttl() -> i64 {
    DEFAULT_ROLE_TTL_SECONDS
}

impl Role {
    /// Clamp a requested TTL into `(0, MAX_ROLE_TTL_SECONDS]`.
    ///
    /// Unset or non-positive values fall back to the default of one hour.
    pub fn clamp_ttl(ttl: Option<i64>) -> i64 {
        match ttl {
            Some(t) if t > MAX_ROLE_TTL_SECONDS => MAX_ROLE_TTL_SECONDS,
            Some(t) if t > 0 => t,
            _ => DEFAULT_ROLE_TTL_SECONDS,
        }
    }
}

/// The current signing key (stored at `privatekey`, sealed at rest).
///
/// `der` is the PKCS#8 DER encoding of the RSA private key. Debug output
/// redacts it.
#[derive(Clone, Serialize, Deserialize)]
pub struct PrivateKeyRecord {
    pub id: String,
    pub expires: DateTime<Utc>,
    #[serde(with = "base64_bytes")]
    pub der: Vec<u8>,
}

impl fmt::Debug for PrivateKeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKeyRecord")
            .field("id", &self.id)
            .field("expires", &self.expires)
            .field("der", &"[REDACTED]")
            .finish()
    }
}

/// Public half of a key generation (stored at `key/<id>`).
///
/// A missing `expires` means the record never expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyRecord {
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
    pub public_pem: String,
}

/// Create/update role request body.
#[derive(Debug, Default, Deserialize)]
pub struct RoleWriteRequest {
    pub defaults: Option<String>,
    pub overrides: Option<String>,
    pub schema: Option<String>,
    pub ttl: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleResponse {
    pub name: String,
    pub defaults: String,
    pub overrides: String,
    pub schema: String,
    pub ttl: i64,
}

/// Name listing (roles).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub keys: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SignRequest {
    /// JSON-encoded claims object; empty or absent means `{}`.
    pub claims: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignResponse {
    pub token: String,
    /// Token expiry (Unix epoch seconds).
    pub expires: i64,
}

/// Public key lookup response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyResponse {
    pub name: String,
    pub public: String,
}

mod base64_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        general_purpose::STANDARD
            .decode(encoded)
            .map_err(serde::de::Error::custom)
    }
}
