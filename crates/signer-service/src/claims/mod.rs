//! Claims composition for role-scoped token signing.
//!
//! A token's claims come from three layers:
//!
//! 1. the caller's claims from the sign request,
//! 2. the role's `defaults`, applied only where the caller left a key unset,
//! 3. the role's `overrides`, applied unconditionally.
//!
//! Each layer is schema-checked before merging. The merged object is checked
//! against the role's operator schema, if any, and the timing claims (`iat`,
//! `exp`, `nbf`) plus `jti` are then written over whatever the merge produced.
//!
//! Validation fails fast per layer: when a layer has errors, later layers are
//! not evaluated and the sorted errors of that layer are returned.

use crate::clock::Clock;
use crate::errors::{SignerError, ValidationErrors};
use crate::models::Role;
use crate::observability::metrics;
use crate::schema::{SchemaLayer, SchemaValidator};
use chrono::{DateTime, Duration, Utc};
use common::jwt::NOT_BEFORE_GRACE;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::instrument;

/// Message reported when a claims document is not a JSON object.
pub const NON_OBJECT_CLAIMS: &str = "/: claims must be a JSON object";

/// Final claims for a token, plus its expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedClaims {
    pub claims: Map<String, Value>,
    pub expires: DateTime<Utc>,
}

/// Merges caller claims with role configuration and stamps timing claims.
pub struct ClaimsComposer {
    validator: Arc<SchemaValidator>,
    clock: Arc<dyn Clock>,
}

impl ClaimsComposer {
    pub fn new(validator: Arc<SchemaValidator>, clock: Arc<dyn Clock>) -> Self {
        Self { validator, clock }
    }

    /// Build the claims for one token.
    ///
    /// `token_id` becomes `jti` and should be unique per request.
    #[instrument(skip_all, fields(ttl = role.ttl))]
    pub fn build_claims(
        &self,
        role: &Role,
        raw_claims: &str,
        token_id: &str,
    ) -> Result<ComposedClaims, SignerError> {
        let claims = parse_document("claims", raw_claims)?;
        let defaults = parse_document("defaults", &role.defaults)?;
        let overrides = parse_document("overrides", &role.overrides)?;

        check(SchemaLayer::BareClaims, self.validator.validate_bare_claims(&claims))?;
        check(SchemaLayer::RoleClaims, self.validator.validate_role_claims(&overrides))?;
        check(SchemaLayer::RoleClaims, self.validator.validate_role_claims(&defaults))?;

        let mut merged = merge(claims, defaults, overrides)?;

        if !role.schema.is_empty() {
            let schema = parse_document("schema", &role.schema)?;
            let operator = self
                .validator
                .compile_operator_schema(&schema)
                .map_err(|errors| failed(SchemaLayer::Operator, errors))?;

            let candidate = Value::Object(merged);
            check(SchemaLayer::Operator, operator.validate(&candidate))?;
            merged = match candidate {
                Value::Object(map) => map,
                _ => return Err(ValidationErrors::single(NON_OBJECT_CLAIMS).into()),
            };
        }

        let now = self.clock.now();
        let ttl = Duration::try_seconds(role.ttl)
            .ok_or_else(|| SignerError::Internal(format!("TTL out of range: {}", role.ttl)))?;
        let grace = Duration::from_std(NOT_BEFORE_GRACE)
            .map_err(|e| SignerError::Internal(format!("Invalid not-before grace: {}", e)))?;
        let expires = now + ttl;

        merged.insert("iat".to_string(), Value::from(now.timestamp()));
        merged.insert("exp".to_string(), Value::from(expires.timestamp()));
        merged.insert("nbf".to_string(), Value::from((now - grace).timestamp()));
        merged.insert("jti".to_string(), Value::from(token_id));

        Ok(ComposedClaims {
            claims: merged,
            expires,
        })
    }

    /// Check a role's configuration without any caller claims.
    ///
    /// Runs the same layer checks as [`Self::build_claims`] on `defaults`,
    /// `overrides` and the operator schema document.
    #[instrument(skip_all)]
    pub fn validate_role(&self, role: &Role) -> Result<(), SignerError> {
        let defaults = parse_document("defaults", &role.defaults)?;
        let overrides = parse_document("overrides", &role.overrides)?;

        check(SchemaLayer::RoleClaims, self.validator.validate_role_claims(&overrides))?;
        check(SchemaLayer::RoleClaims, self.validator.validate_role_claims(&defaults))?;

        if !role.schema.is_empty() {
            let schema = parse_document("schema", &role.schema)?;
            self.validator
                .compile_operator_schema(&schema)
                .map_err(|errors| failed(SchemaLayer::Operator, errors))?;
        }

        Ok(())
    }
}

/// Parse a JSON document; an empty string means `{}`.
fn parse_document(name: &str, raw: &str) -> Result<Value, SignerError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_str(raw).map_err(|e| SignerError::InvalidInput(format!("{}: {}", name, e)))
}

fn failed(layer: SchemaLayer, errors: ValidationErrors) -> SignerError {
    tracing::debug!(
        target: "signer.claims",
        layer = layer.as_str(),
        error_count = errors.len(),
        "Claims validation failed"
    );
    metrics::record_claims_validation_failure(layer);
    SignerError::Validation(errors)
}

fn check(layer: SchemaLayer, result: Result<(), ValidationErrors>) -> Result<(), SignerError> {
    result.map_err(|errors| failed(layer, errors))
}

/// Shallow merge. Defaults fill gaps, overrides always win.
fn merge(claims: Value, defaults: Value, overrides: Value) -> Result<Map<String, Value>, SignerError> {
    let (Value::Object(mut merged), Value::Object(defaults), Value::Object(overrides)) =
        (claims, defaults, overrides)
    else {
        return Err(ValidationErrors::single(NON_OBJECT_CLAIMS).into());
    };

    for (key, value) in defaults {
        merged.entry(key).or_insert(value);
    }
    for (key, value) in overrides {
        merged.insert(key, value);
    }

    Ok(merged)
}
