//! JSON Schema validation for claims and role configuration.
//!
//! Two built-in schemas are compiled once at startup:
//!
//! - **bare claims**: what a caller may put in a sign request. Every reserved
//!   claim (`iss`, `sub`, `aud`, `exp`, `nbf`, `iat`, `jti`) is forbidden.
//! - **role claims**: what an operator may put in role defaults/overrides.
//!   `aud` and `sub` are allowed but must be a colon-free string or a URI;
//!   the remaining reserved claims are forbidden.
//!
//! Operator schemas vary per role and are compiled on demand after a
//! meta-schema check.
//!
//! Every failure is rendered as `"<instance path>: <message>"` and the list is
//! sorted before it leaves this module.

use crate::errors::{SignerError, ValidationErrors};
use jsonschema::{Retrieve, Uri, Validator};
use std::fmt;
use serde_json::{json, Value};

/// Which validation layer rejected a document (metrics label).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaLayer {
    BareClaims,
    RoleClaims,
    Operator,
}

impl SchemaLayer {
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaLayer::BareClaims => "bare_claims",
            SchemaLayer::RoleClaims => "role_claims",
            SchemaLayer::Operator => "operator",
        }
    }
}

fn bare_claims_schema() -> Value {
    json!({
        "title": "Claims",
        "type": "object",
        "properties": {
            "iss": false,
            "sub": false,
            "aud": false,
            "exp": false,
            "nbf": false,
            "iat": false,
            "jti": false
        }
    })
}

fn role_claims_schema() -> Value {
    json!({
        "title": "Role claims",
        "type": "object",
        "properties": {
            "aud": {
                "anyOf": [
                    { "$ref": "#/$defs/stringOrURI" },
                    { "type": "array", "items": { "$ref": "#/$defs/stringOrURI" } }
                ]
            },
            "sub": { "$ref": "#/$defs/stringOrURI" },
            "iss": false,
            "exp": false,
            "nbf": false,
            "iat": false,
            "jti": false
        },
        "$defs": {
            "stringOrURI": {
                "anyOf": [
                    { "type": "string", "pattern": "^[^:]*$" },
                    { "type": "string", "format": "uri" }
                ]
            }
        }
    })
}

/// Refuses every `$ref` that leaves the schema document.
struct LocalRefsOnly;

impl Retrieve for LocalRefsOnly {
    fn retrieve(&self, uri: &Uri<String>) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external reference {} is not allowed", uri.as_str()).into())
    }
}

fn compile(schema: &Value) -> Result<Validator, jsonschema::ValidationError<'static>> {
    jsonschema::options()
        .should_validate_formats(true)
        .with_retriever(LocalRefsOnly)
        .build(schema)
}

fn render_path(path: &str) -> &str {
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

fn collect_errors(validator: &Validator, instance: &Value) -> Result<(), ValidationErrors> {
    let messages: Vec<String> = validator
        .iter_errors(instance)
        .map(|error| {
            let path = error.instance_path().to_string();
            format!("{}: {}", render_path(&path), error)
        })
        .collect();

    if messages.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors::new(messages))
    }
}

/// An operator-supplied schema that passed the meta-schema check.
pub struct OperatorSchema {
    validator: Validator,
}

impl fmt::Debug for OperatorSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorSchema").finish_non_exhaustive()
    }
}

impl OperatorSchema {
    pub fn validate(&self, claims: &Value) -> Result<(), ValidationErrors> {
        collect_errors(&self.validator, claims)
    }
}

/// Compiled built-in schemas, shared read-only across requests.
pub struct SchemaValidator {
    bare_claims: Validator,
    role_claims: Validator,
}

impl SchemaValidator {
    /// Compile the built-in schemas.
    pub fn new() -> Result<Self, SignerError> {
        let bare_claims = compile(&bare_claims_schema()).map_err(|e| {
            SignerError::Internal(format!("Built-in claims schema failed to compile: {}", e))
        })?;
        let role_claims = compile(&role_claims_schema()).map_err(|e| {
            SignerError::Internal(format!("Built-in role schema failed to compile: {}", e))
        })?;

        Ok(Self {
            bare_claims,
            role_claims,
        })
    }

    /// Check caller-supplied claims: must be an object with no reserved claims.
    pub fn validate_bare_claims(&self, claims: &Value) -> Result<(), ValidationErrors> {
        collect_errors(&self.bare_claims, claims)
    }

    /// Check role defaults or overrides.
    pub fn validate_role_claims(&self, document: &Value) -> Result<(), ValidationErrors> {
        collect_errors(&self.role_claims, document)
    }

    /// Meta-validate an operator schema document, then compile it.
    ///
    /// Every meta-schema violation is reported. References outside the
    /// document are never fetched and fail compilation.
    pub fn compile_operator_schema(&self, schema: &Value) -> Result<OperatorSchema, ValidationErrors> {
        let meta = jsonschema::meta::validator_for(schema)
            .map_err(|e| ValidationErrors::single(format!("schema: {}", e)))?;

        let violations: Vec<String> = meta
            .as_ref()
            .iter_errors(schema)
            .map(|error| format!("schema{}: {}", error.instance_path(), error))
            .collect();
        if !violations.is_empty() {
            return Err(ValidationErrors::new(violations));
        }

        let validator =
            compile(schema).map_err(|e| ValidationErrors::single(format!("schema: {}", e)))?;

        Ok(OperatorSchema { validator })
    }
}
