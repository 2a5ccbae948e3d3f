//! Token Signer
//!
//! Issues role-scoped RS256 JWTs over HTTP and rotates its signing key.

use signer_service::clock::{Clock, SystemClock};
use signer_service::config::Config;
use signer_service::observability::{self, metrics::init_metrics_recorder};
use signer_service::routes::{self, AppState};
use signer_service::services::KeyExpirer;
use signer_service::storage::{InMemoryStore, KeyValueStore, SealedStore};
use signer_service::tasks::start_key_sweeper;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configuration first: it selects the log format
    let config = Config::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    observability::init_tracing(&config.observability);

    info!(
        bind_address = %config.bind_address,
        key_sweep_interval_seconds = config.key_sweep_interval.as_secs(),
        "Starting Token Signer"
    );

    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics: {}", e);
        e
    })?;

    let Config {
        bind_address,
        master_key,
        key_sweep_interval,
        ..
    } = config;

    let store: Arc<dyn KeyValueStore> = Arc::new(SealedStore::new(InMemoryStore::new(), master_key));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let state = Arc::new(AppState::new(Arc::clone(&store), Arc::clone(&clock))?);

    // Warm the key so the first sign request does not pay for generation
    let key = state.key_manager.get().await.map_err(|e| {
        error!("Failed to initialize signing key: {}", e);
        e
    })?;
    info!(key_id = %key.id(), "Signing key ready");

    let cancel_token = CancellationToken::new();
    let expirer = Arc::new(KeyExpirer::new(
        Arc::clone(&store),
        Arc::clone(&state.key_manager),
    ));
    let sweeper = tokio::spawn(start_key_sweeper(
        expirer,
        clock,
        key_sweep_interval,
        cancel_token.clone(),
    ));

    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Token Signer listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel_token.cancel();
    if let Err(e) = sweeper.await {
        error!("Key sweeper task failed: {}", e);
    }

    info!("Token Signer shutdown complete");

    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
