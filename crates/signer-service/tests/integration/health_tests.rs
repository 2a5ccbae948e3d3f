//! Integration tests for the liveness and metrics endpoints

use reqwest::StatusCode;
use signer_test_utils::{TestRoleBuilder, TestSignerServer};

/// /health returns 200 "OK" without touching storage or keys.
#[tokio::test]
async fn test_health_endpoint_returns_ok() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestSignerServer::spawn().await?;

    // Act
    let response = server
        .client()
        .get(format!("{}/health", server.url()))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "OK");
    assert!(
        server.state().key_manager.current_key_id().await.is_none(),
        "Health check must not generate a key"
    );

    Ok(())
}

/// /metrics is served in Prometheus text format and never leaks role names.
#[tokio::test]
async fn test_metrics_endpoint_is_scrapable() -> Result<(), anyhow::Error> {
    let server = TestSignerServer::spawn().await?;
    server
        .put_role("secret-role-name", TestRoleBuilder::new())
        .await?;
    server.sign("secret-role-name", None).await?;

    let response = server
        .client()
        .get(format!("{}/metrics", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await?;
    assert!(
        !body.contains("secret-role-name"),
        "Metric labels must not carry role names"
    );

    Ok(())
}
