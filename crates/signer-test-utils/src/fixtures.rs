//! Deterministic fixtures.

use base64::{engine::general_purpose, Engine};
use common::secret::SecretBox;
use serde_json::{json, Value};

/// Fixed 32-byte master key for sealing `privatekey` in tests.
pub fn test_master_key() -> Vec<u8> {
    (0u8..32).map(|i| i.wrapping_mul(7).wrapping_add(3)).collect()
}

pub fn test_master_key_secret() -> SecretBox<Vec<u8>> {
    SecretBox::new(Box::new(test_master_key()))
}

/// The test master key as `SIGNER_MASTER_KEY` expects it.
pub fn test_master_key_base64() -> String {
    general_purpose::STANDARD.encode(test_master_key())
}

/// Builder for role write request bodies.
///
/// # Example
/// ```rust,ignore
/// let body = TestRoleBuilder::new()
///     .with_defaults(json!({"team": "infra"}))
///     .with_overrides(json!({"aud": "billing"}))
///     .with_ttl(600)
///     .build();
/// ```
#[derive(Debug, Default, Clone)]
pub struct TestRoleBuilder {
    defaults: Option<Value>,
    overrides: Option<Value>,
    schema: Option<Value>,
    raw_schema: Option<String>,
    ttl: Option<i64>,
}

impl TestRoleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(mut self, defaults: Value) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn with_overrides(mut self, overrides: Value) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Schema text sent as-is, for malformed-JSON cases.
    pub fn with_raw_schema(mut self, schema: &str) -> Self {
        self.raw_schema = Some(schema.to_string());
        self
    }

    pub fn with_ttl(mut self, ttl: i64) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Request body for `POST /role/:name`. Documents are JSON-encoded strings.
    pub fn build(self) -> Value {
        let mut body = serde_json::Map::new();
        if let Some(defaults) = self.defaults {
            body.insert("defaults".to_string(), json!(defaults.to_string()));
        }
        if let Some(overrides) = self.overrides {
            body.insert("overrides".to_string(), json!(overrides.to_string()));
        }
        if let Some(schema) = self.raw_schema {
            body.insert("schema".to_string(), json!(schema));
        } else if let Some(schema) = self.schema {
            body.insert("schema".to_string(), json!(schema.to_string()));
        }
        if let Some(ttl) = self.ttl {
            body.insert("ttl".to_string(), json!(ttl));
        }
        Value::Object(body)
    }
}
