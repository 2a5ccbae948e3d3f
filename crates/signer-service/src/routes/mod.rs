//! HTTP routes for the token signer.
//!
//! Defines the Axum router and application state.

use crate::claims::ClaimsComposer;
use crate::clock::Clock;
use crate::errors::SignerError;
use crate::handlers;
use crate::schema::SchemaValidator;
use crate::services::KeyManager;
use crate::storage::KeyValueStore;
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Request timeout. Covers a cold start that has to generate a key.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Role, key and public key records.
    pub store: Arc<dyn KeyValueStore>,

    /// Claims composition and role validation.
    pub composer: Arc<ClaimsComposer>,

    /// Owner of the current signing key.
    pub key_manager: Arc<KeyManager>,
}

impl AppState {
    /// Wire the composer and key manager over a shared store and clock.
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Result<Self, SignerError> {
        let validator = Arc::new(SchemaValidator::new()?);
        let composer = Arc::new(ClaimsComposer::new(validator, Arc::clone(&clock)));
        let key_manager = Arc::new(KeyManager::new(Arc::clone(&store), clock));

        Ok(Self {
            store,
            composer,
            key_manager,
        })
    }
}

/// Build the application routes.
///
/// - `/health` - liveness probe
/// - `/metrics` - Prometheus scrape endpoint
/// - `/role`, `/role/:name` - role administration
/// - `/sign/:name` - token issuance
/// - `/key/:id` - public key lookup for verifiers
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/role", get(handlers::list_roles))
        .route(
            "/role/:name",
            get(handlers::read_role)
                .post(handlers::write_role)
                .put(handlers::write_role)
                .delete(handlers::delete_role),
        )
        .route("/sign/:name", post(handlers::sign))
        .route("/key/:id", get(handlers::read_key))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    api_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
}
