//! Token Signer Service Library
//!
//! Issues short-lived RS256 JWTs on behalf of named roles. Claims are
//! composed from caller input, role defaults and role overrides and
//! validated against built-in and operator-supplied JSON Schemas; the
//! signing key is generated, persisted, cached and rotated automatically.
//!
//! # Modules
//!
//! - `claims` - Claims composition and role validation
//! - `clock` - Injectable time source
//! - `config` - Service configuration
//! - `crypto` - RSA key handling, JWT signing, sealing at rest
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `models` - Persisted records and API payloads
//! - `observability` - Tracing setup and Prometheus metrics
//! - `routes` - Router and shared application state
//! - `schema` - JSON Schema validation of claims and role configuration
//! - `services` - Key manager, key expirer, role and token services
//! - `storage` - Key-value persistence boundary
//! - `tasks` - Background maintenance tasks

pub mod claims;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod observability;
pub mod routes;
pub mod schema;
pub mod services;
pub mod storage;
pub mod tasks;
