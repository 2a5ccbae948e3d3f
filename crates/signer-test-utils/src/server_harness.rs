//! Test server harness for E2E testing
//!
//! Provides TestSignerServer for spawning real signer instances in tests.

use crate::clock::FixedClock;
use crate::fixtures::{test_master_key_secret, TestRoleBuilder};
use signer_service::clock::{Clock, SystemClock};
use signer_service::models::SignResponse;
use signer_service::observability::metrics::init_metrics_recorder;
use signer_service::routes::{self, AppState};
use signer_service::storage::{InMemoryStore, KeyValueStore, SealedStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Test harness for spawning the token signer in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_sign_e2e() -> Result<()> {
///     let server = TestSignerServer::spawn().await?;
///     server.put_role("web", TestRoleBuilder::new()).await?;
///
///     let response = server.sign("web", Some(r#"{"team":"infra"}"#)).await?;
///     response.token.assert_valid_jwt();
///     Ok(())
/// }
/// ```
pub struct TestSignerServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    client: reqwest::Client,
    _handle: JoinHandle<()>,
}

impl TestSignerServer {
    /// Spawn a server over a fresh sealed in-memory store and the system clock.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_clock(Arc::new(SystemClock)).await
    }

    /// Spawn a server whose time comes from `clock`.
    ///
    /// Pair with [`FixedClock`] to step across key expiry.
    pub async fn spawn_with_clock(clock: Arc<dyn Clock>) -> Result<Self, anyhow::Error> {
        let store: Arc<dyn KeyValueStore> = Arc::new(SealedStore::new(
            InMemoryStore::new(),
            test_master_key_secret(),
        ));
        Self::spawn_with(store, clock).await
    }

    /// Spawn a server over an arbitrary store and clock.
    pub async fn spawn_with(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, anyhow::Error> {
        let state = Arc::new(
            AppState::new(store, clock)
                .map_err(|e| anyhow::anyhow!("Failed to build app state: {}", e))?,
        );

        // The global recorder can only be installed once per test process.
        // Later servers get a standalone recorder.
        let metrics_handle = match init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                use metrics_exporter_prometheus::PrometheusBuilder;
                PrometheusBuilder::new().build_recorder().handle()
            }
        };

        let app = routes::build_routes(Arc::clone(&state), metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            state,
            client: reqwest::Client::new(),
            _handle: handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Shared application state, for inspecting the store or key manager.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.state.store
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Create or replace a role, failing unless the server answers 204.
    pub async fn put_role(
        &self,
        name: &str,
        role: TestRoleBuilder,
    ) -> Result<(), anyhow::Error> {
        let response = self
            .client
            .post(format!("{}/role/{}", self.url(), name))
            .json(&role.build())
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::NO_CONTENT {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Role write failed with {}: {}", status, body);
        }
        Ok(())
    }

    /// Issue a token for `role`, failing unless the server answers 200.
    pub async fn sign(
        &self,
        role: &str,
        claims: Option<&str>,
    ) -> Result<SignResponse, anyhow::Error> {
        let body = match claims {
            Some(claims) => serde_json::json!({ "claims": claims }),
            None => serde_json::json!({}),
        };

        let response = self
            .client
            .post(format!("{}/sign/{}", self.url(), role))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Sign failed with {}: {}", status, body);
        }
        Ok(response.json().await?)
    }

    /// Fetch the PEM public key for `kid`.
    pub async fn public_key(&self, kid: &str) -> Result<String, anyhow::Error> {
        let response = self
            .client
            .get(format!("{}/key/{}", self.url(), kid))
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = response.json().await?;
        body.get("public")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Key response missing public key"))
    }
}

/// Convenience: a server on a [`FixedClock`] pinned to the test epoch.
pub async fn spawn_with_fixed_clock() -> Result<(TestSignerServer, Arc<FixedClock>), anyhow::Error>
{
    let clock = Arc::new(FixedClock::default());
    let server = TestSignerServer::spawn_with_clock(clock.clone()).await?;
    Ok((server, clock))
}
