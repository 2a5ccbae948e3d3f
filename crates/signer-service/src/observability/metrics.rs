//! Metrics definitions for the token signer.
//!
//! All metrics follow Prometheus naming conventions:
//! - `signer_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `status`: 2 values (success, error)
//! - `layer`: 3 values (bare_claims, role_claims, operator)

use crate::schema::SchemaLayer;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and return the handle served at `/metrics`.
///
/// # Errors
///
/// Returns error if a recorder is already installed for this process.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // Signing is dominated by the RSA operation; generation spikes are rare
        .set_buckets_for_metric(
            Matcher::Prefix("signer_token_issuance".to_string()),
            &[
                0.001, 0.002, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500,
            ],
        )
        .map_err(|e| format!("Failed to set token issuance buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Record token issuance duration and outcome.
///
/// Metric: `signer_token_issuance_total`, `signer_token_issuance_duration_seconds`
/// Labels: `status`
pub fn record_token_issuance(status: &str, duration: Duration) {
    histogram!("signer_token_issuance_duration_seconds", "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("signer_token_issuance_total", "status" => status.to_string()).increment(1);
}

/// Record a rejected claims document.
///
/// Metric: `signer_claims_validation_failures_total`
/// Labels: `layer`
pub fn record_claims_validation_failure(layer: SchemaLayer) {
    counter!("signer_claims_validation_failures_total", "layer" => layer.as_str()).increment(1);
}

// ============================================================================
// Key Management Metrics
// ============================================================================

/// Record a signing key generation attempt.
///
/// Metric: `signer_key_generation_total`
/// Labels: `status`
pub fn record_key_generation(status: &str) {
    counter!("signer_key_generation_total", "status" => status.to_string()).increment(1);
}

/// Record public key records removed by a sweep.
///
/// Metric: `signer_keys_swept_total`
pub fn record_keys_swept(count: u64) {
    counter!("signer_keys_swept_total").increment(count);
}
