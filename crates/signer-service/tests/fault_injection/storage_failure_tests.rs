//! Storage failures surface as opaque 500s and never leak backend detail.

use reqwest::StatusCode;
use serde_json::{json, Value};
use signer_service::clock::SystemClock;
use signer_test_utils::{FailingStore, TestSignerServer};
use std::sync::Arc;

#[tokio::test]
async fn test_storage_failure_is_internal_error() -> Result<(), anyhow::Error> {
    let server = TestSignerServer::spawn_with(Arc::new(FailingStore), Arc::new(SystemClock)).await?;

    let response = server
        .client()
        .post(format!("{}/sign/web", server.url()))
        .json(&json!({}))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await?;
    assert_eq!(body["errors"], json!(["An internal error occurred"]));

    Ok(())
}

#[tokio::test]
async fn test_role_listing_fails_cleanly() -> Result<(), anyhow::Error> {
    let server = TestSignerServer::spawn_with(Arc::new(FailingStore), Arc::new(SystemClock)).await?;

    let response = server
        .client()
        .get(format!("{}/role", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.text().await?;
    assert!(!body.contains("store unavailable"));

    Ok(())
}

#[tokio::test]
async fn test_health_survives_storage_failure() -> Result<(), anyhow::Error> {
    let server = TestSignerServer::spawn_with(Arc::new(FailingStore), Arc::new(SystemClock)).await?;

    let response = server
        .client()
        .get(format!("{}/health", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}
