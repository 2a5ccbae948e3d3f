//! Observability for the token signer: tracing setup and metrics.
//!
//! # Privacy by Default
//!
//! Instrumented functions use `#[instrument(skip_all)]` and allow-list their
//! fields. Claims, private key material and issued tokens never appear in
//! logs; role names and key ids may.

pub mod metrics;

use common::config::{LogFormat, ObservabilityConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured default filter.
pub fn init_tracing(config: &ObservabilityConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_filter.clone().into());

    let (json_layer, text_layer) = match config.log_format {
        LogFormat::Json => (Some(fmt::layer().json()), None),
        LogFormat::Text => (None, Some(fmt::layer())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}
