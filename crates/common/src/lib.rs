//! Common utilities and types shared across token signer components.

#![warn(clippy::pedantic)]

/// Module for common error types
pub mod error;

/// Module for common configuration
pub mod config;

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for JWT utilities (size limits, grace window, key ID extraction)
pub mod jwt;
