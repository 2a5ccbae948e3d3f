use base64::{engine::general_purpose, Engine as _};
use common::config::{LogFormat, ObservabilityConfig};
use common::secret::SecretBox;
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default bind address for the HTTP listener.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8200";

/// Default interval between expired public key sweeps (1 hour).
pub const DEFAULT_KEY_SWEEP_INTERVAL_SECONDS: u64 = 3600;

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "signer_service=info,tower_http=info";

/// Required master key length (AES-256-GCM).
const MASTER_KEY_LEN: usize = 32;

#[derive(Debug)]
pub struct Config {
    pub bind_address: String,
    /// Seals the `privatekey` storage slot at rest.
    pub master_key: SecretBox<Vec<u8>>,
    pub key_sweep_interval: Duration,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid master key format: {0}")]
    InvalidMasterKey(String),

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let master_key_base64 = vars
            .get("SIGNER_MASTER_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("SIGNER_MASTER_KEY".to_string()))?;

        let master_key = general_purpose::STANDARD
            .decode(master_key_base64)
            .map_err(ConfigError::Base64Error)?;

        if master_key.len() != MASTER_KEY_LEN {
            return Err(ConfigError::InvalidMasterKey(format!(
                "Expected {} bytes, got {}",
                MASTER_KEY_LEN,
                master_key.len()
            )));
        }

        let key_sweep_interval_seconds = match vars.get("KEY_SWEEP_INTERVAL_SECONDS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    name: "KEY_SWEEP_INTERVAL_SECONDS".to_string(),
                    reason: format!("'{}' is not a non-negative integer", raw),
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        name: "KEY_SWEEP_INTERVAL_SECONDS".to_string(),
                        reason: "must be greater than zero".to_string(),
                    });
                }
                secs
            }
            None => DEFAULT_KEY_SWEEP_INTERVAL_SECONDS,
        };

        let log_format = match vars.get("LOG_FORMAT") {
            Some(raw) => LogFormat::parse(raw).ok_or_else(|| ConfigError::InvalidValue {
                name: "LOG_FORMAT".to_string(),
                reason: format!("'{}' is not one of: text, json", raw),
            })?,
            None => LogFormat::Text,
        };

        Ok(Config {
            bind_address,
            master_key: SecretBox::new(Box::new(master_key)),
            key_sweep_interval: Duration::from_secs(key_sweep_interval_seconds),
            observability: ObservabilityConfig {
                log_filter: DEFAULT_LOG_FILTER.to_string(),
                log_format,
            },
        })
    }
}
