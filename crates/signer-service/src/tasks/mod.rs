//! Background tasks for the token signer.
//!
//! - `key_sweeper` - Prunes expired public key records

pub mod key_sweeper;

pub use key_sweeper::start_key_sweeper;
