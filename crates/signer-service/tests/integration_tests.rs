//! Integration tests for the token signer
//!
//! This is the top-level integration test harness that Cargo discovers.
//! Test modules are organized in the integration/ subdirectory.

#[path = "integration/health_tests.rs"]
mod health_tests;

#[path = "integration/role_tests.rs"]
mod role_tests;

#[path = "integration/sign_tests.rs"]
mod sign_tests;

#[path = "integration/key_rotation_tests.rs"]
mod key_rotation_tests;
