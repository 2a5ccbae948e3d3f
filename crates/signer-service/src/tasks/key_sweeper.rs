//! Periodic public key sweep.
//!
//! # Graceful Shutdown
//!
//! The task exits when its cancellation token is cancelled. A sweep already
//! in progress completes first.

use crate::clock::Clock;
use crate::services::KeyExpirer;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Run [`KeyExpirer::sweep`] every `interval` until `cancel_token` fires.
///
/// The first sweep runs immediately. Sweep failures are logged and the loop
/// keeps going.
#[instrument(skip_all, name = "signer.task.key_sweeper")]
pub async fn start_key_sweeper(
    expirer: Arc<KeyExpirer>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    cancel_token: CancellationToken,
) {
    info!(
        target: "signer.task.key_sweeper",
        interval_seconds = interval.as_secs(),
        "Starting key sweeper task"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_sweep(&expirer, clock.as_ref()).await;
            }
            _ = cancel_token.cancelled() => {
                info!(
                    target: "signer.task.key_sweeper",
                    "Key sweeper received shutdown signal, exiting"
                );
                break;
            }
        }
    }

    info!(target: "signer.task.key_sweeper", "Key sweeper task stopped");
}

/// One sweep iteration.
pub(crate) async fn run_sweep(expirer: &KeyExpirer, clock: &dyn Clock) {
    match expirer.sweep(clock.now()).await {
        Ok(0) => {}
        Ok(deleted) => {
            info!(
                target: "signer.task.key_sweeper",
                deleted_count = deleted,
                "Swept expired public keys"
            );
        }
        Err(e) => {
            tracing::error!(
                target: "signer.task.key_sweeper",
                error = %e,
                "Public key sweep failed"
            );
        }
    }
}
