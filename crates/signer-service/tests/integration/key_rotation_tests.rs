//! Integration tests for key rotation and public key expiry
//!
//! Time is driven by a `FixedClock`, so tokens are inspected without
//! signature verification (their timestamps sit in the past).

use chrono::Duration;
use common::jwt::extract_kid;
use reqwest::StatusCode;
use signer_service::clock::Clock;
use signer_service::services::KeyExpirer;
use signer_service::storage::{KeyValueStore, PRIVATE_KEY_PATH};
use signer_test_utils::{spawn_with_fixed_clock, TestRoleBuilder, TokenAssertions};
use std::sync::Arc;

fn kid_of(token: &str) -> Result<String, anyhow::Error> {
    Ok(extract_kid(token)?)
}

/// Key A signs until it expires; afterwards key B takes over while A's public
/// key stays resolvable until the sweeper removes it.
#[tokio::test]
async fn test_rotation_keeps_old_public_key_until_swept() -> Result<(), anyhow::Error> {
    // Arrange
    let (server, clock) = spawn_with_fixed_clock().await?;
    server.put_role("web", TestRoleBuilder::new()).await?;

    // Step 1: first token generates key A
    let token_a = server.sign("web", None).await?.token;
    let kid_a = kid_of(&token_a)?;
    token_a.assert_valid_jwt();

    // Step 2: same key while unexpired
    clock.advance(Duration::hours(23));
    let kid_same = kid_of(&server.sign("web", None).await?.token)?;
    assert_eq!(kid_same, kid_a, "Key must be reused until expiry");

    // Step 3: past expiry, key B
    clock.advance(Duration::hours(2));
    let kid_b = kid_of(&server.sign("web", None).await?.token)?;
    assert_ne!(kid_b, kid_a, "Expired key must be rotated");

    // Step 4: A's public key is still served during its grace period
    assert!(server.public_key(&kid_a).await.is_ok());
    assert!(server.public_key(&kid_b).await.is_ok());

    // Step 5: sweep after A's grace period
    let expirer = KeyExpirer::new(
        Arc::clone(server.store()),
        Arc::clone(&server.state().key_manager),
    );
    clock.advance(Duration::days(1));
    let deleted = expirer.sweep(clock.now()).await?;
    assert_eq!(deleted, 1);

    let response = server
        .client()
        .get(format!("{}/key/{}", server.url(), kid_a))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The current key survives even once its own record would be stale
    clock.advance(Duration::days(5));
    expirer.sweep(clock.now()).await?;
    assert!(server.public_key(&kid_b).await.is_ok());

    Ok(())
}

#[tokio::test]
async fn test_private_key_is_sealed_at_rest() -> Result<(), anyhow::Error> {
    let (server, _clock) = spawn_with_fixed_clock().await?;
    server.put_role("web", TestRoleBuilder::new()).await?;
    let token = server.sign("web", None).await?.token;
    let kid = kid_of(&token)?;

    // Through the sealed store the record reads back as JSON naming the key
    let stored = server
        .store()
        .get(PRIVATE_KEY_PATH)
        .await?
        .ok_or_else(|| anyhow::anyhow!("privatekey not persisted"))?;
    let record: serde_json::Value = serde_json::from_slice(&stored)?;
    assert_eq!(record["id"], kid.as_str());

    Ok(())
}

#[tokio::test]
async fn test_unknown_key_is_404() -> Result<(), anyhow::Error> {
    let (server, _clock) = spawn_with_fixed_clock().await?;

    let response = server
        .client()
        .get(format!("{}/key/does-not-exist", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}
