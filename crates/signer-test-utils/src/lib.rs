//! # Token Signer Test Utilities
//!
//! Shared test utilities for the token signer service.
//!
//! This crate provides:
//! - Controllable time (`FixedClock`)
//! - Instrumented stores (`CountingStore`, `FailingStore`)
//! - Fixtures (test master key, role builder)
//! - Server test harness (`TestSignerServer` for E2E tests)
//! - Custom assertions (`TokenAssertions` trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use signer_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestSignerServer::spawn().await?;
//!     server.put_role("web", TestRoleBuilder::new().with_ttl(600)).await?;
//!
//!     let token = server.sign("web", Some(r#"{"team":"infra"}"#)).await?.token;
//!     token.assert_valid_jwt().assert_claim("team", json!("infra"));
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod clock;
pub mod fixtures;
pub mod server_harness;
pub mod stores;

// Re-export commonly used items
pub use assertions::*;
pub use clock::*;
pub use fixtures::*;
pub use server_harness::*;
pub use stores::*;
