pub mod key_expirer;
pub mod key_manager;
pub mod key_service;
pub mod role_service;
pub mod token_service;

pub use key_expirer::KeyExpirer;
pub use key_manager::{KeyManager, SigningKey};
