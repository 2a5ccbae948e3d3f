//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate. The signer keeps
//! its storage master key behind these wrappers so that `Debug` output and
//! `tracing` fields never show it.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretBox};
//!
//! #[derive(Debug)]
//! struct SealingConfig {
//!     sealed_paths: Vec<String>,
//!     master_key: SecretBox<Vec<u8>>,
//! }
//!
//! let config = SealingConfig {
//!     sealed_paths: vec!["privatekey".to_string()],
//!     master_key: SecretBox::new(Box::new(vec![7u8; 32])),
//! };
//!
//! // Debug output is redacted
//! assert!(!format!("{config:?}").contains("7, 7"));
//!
//! // Access requires an explicit call
//! assert_eq!(config.master_key.expose_secret().len(), 32);
//! ```
//!
//! Secrets are zeroized when dropped.

// Re-export the main types from secrecy
pub use secrecy::{ExposeSecret, SecretBox, SecretString};
