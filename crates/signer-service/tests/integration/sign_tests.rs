//! Integration tests for token issuance over HTTP
//!
//! Tokens are verified the way a relying party would: resolve `kid` via
//! `/key/:id` and check the RS256 signature against that PEM.

use common::jwt::extract_kid;
use reqwest::StatusCode;
use serde_json::{json, Value};
use signer_service::crypto;
use signer_test_utils::{TestRoleBuilder, TestSignerServer, TokenAssertions};

#[tokio::test]
async fn test_sign_and_verify_round_trip() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestSignerServer::spawn().await?;
    server
        .put_role(
            "web",
            TestRoleBuilder::new()
                .with_defaults(json!({"team": "default-team", "region": "eu"}))
                .with_overrides(json!({"aud": "billing", "sub": "svc-web"}))
                .with_ttl(600),
        )
        .await?;

    // Act
    let response = server.sign("web", Some(r#"{"team":"infra"}"#)).await?;

    // Assert
    let token = response.token;
    let kid = extract_kid(&token)?;
    token
        .assert_valid_jwt()
        .assert_signed_by(&kid)
        .assert_claim("team", json!("infra"))
        .assert_claim("region", json!("eu"))
        .assert_claim("aud", json!("billing"))
        .assert_claim("sub", json!("svc-web"))
        .assert_no_claim("iss")
        .assert_lifetime(600);

    let pem = server.public_key(&kid).await?;
    let claims = crypto::verify_token(&token, &pem)?;
    assert_eq!(claims["exp"], json!(response.expires));
    assert!(
        claims["jti"].as_str().is_some_and(|jti| !jti.is_empty()),
        "Every token carries a jti"
    );

    Ok(())
}

#[tokio::test]
async fn test_token_does_not_verify_against_other_key() -> Result<(), anyhow::Error> {
    let server = TestSignerServer::spawn().await?;
    let other = TestSignerServer::spawn().await?;
    server.put_role("web", TestRoleBuilder::new()).await?;
    other.put_role("web", TestRoleBuilder::new()).await?;

    let token = server.sign("web", None).await?.token;
    let other_token = other.sign("web", None).await?.token;

    let other_kid = extract_kid(&other_token)?;
    let other_pem = other.public_key(&other_kid).await?;

    assert!(
        crypto::verify_token(&token, &other_pem).is_err(),
        "Token must not verify against an unrelated key"
    );

    Ok(())
}

#[tokio::test]
async fn test_each_token_gets_unique_jti() -> Result<(), anyhow::Error> {
    let server = TestSignerServer::spawn().await?;
    server.put_role("web", TestRoleBuilder::new()).await?;

    let first = signer_test_utils::decode_payload(&server.sign("web", None).await?.token);
    let second = signer_test_utils::decode_payload(&server.sign("web", None).await?.token);

    assert_ne!(first["jti"], second["jti"]);

    Ok(())
}

#[tokio::test]
async fn test_sign_unknown_role_is_404() -> Result<(), anyhow::Error> {
    let server = TestSignerServer::spawn().await?;

    let response = server
        .client()
        .post(format!("{}/sign/missing", server.url()))
        .json(&json!({}))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await?;
    assert_eq!(body["errors"], json!(["no such role"]));

    Ok(())
}

#[tokio::test]
async fn test_reserved_claims_from_caller_are_rejected() -> Result<(), anyhow::Error> {
    let server = TestSignerServer::spawn().await?;
    server.put_role("web", TestRoleBuilder::new()).await?;

    let response = server
        .client()
        .post(format!("{}/sign/web", server.url()))
        .json(&json!({"claims": r#"{"sub":"me","iat":1}"#}))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    let errors: Vec<&str> = body["errors"]
        .as_array()
        .map(|e| e.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    assert_eq!(errors.len(), 2, "{errors:?}");
    assert!(errors[0].starts_with("/iat: "), "{errors:?}");
    assert!(errors[1].starts_with("/sub: "), "{errors:?}");

    // No key is generated for a rejected request
    assert!(server.state().key_manager.current_key_id().await.is_none());

    Ok(())
}

#[tokio::test]
async fn test_operator_schema_is_enforced() -> Result<(), anyhow::Error> {
    let server = TestSignerServer::spawn().await?;
    server
        .put_role(
            "web",
            TestRoleBuilder::new().with_schema(json!({
                "type": "object",
                "properties": {
                    "scopes": {
                        "type": "array",
                        "items": { "enum": ["read", "write"] }
                    }
                },
                "required": ["scopes"]
            })),
        )
        .await?;

    let ok = server.sign("web", Some(r#"{"scopes":["read"]}"#)).await?;
    ok.token.assert_claim("scopes", json!(["read"]));

    let response = server
        .client()
        .post(format!("{}/sign/web", server.url()))
        .json(&json!({"claims": r#"{"scopes":["admin"]}"#}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert!(
        body["errors"][0]
            .as_str()
            .is_some_and(|e| e.starts_with("/scopes/0: ")),
        "{body}"
    );

    Ok(())
}

#[tokio::test]
async fn test_non_object_claims_are_rejected() -> Result<(), anyhow::Error> {
    let server = TestSignerServer::spawn().await?;
    server.put_role("web", TestRoleBuilder::new()).await?;

    let response = server
        .client()
        .post(format!("{}/sign/web", server.url()))
        .json(&json!({"claims": "[1,2]"}))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_sign_without_body_uses_empty_claims() -> Result<(), anyhow::Error> {
    let server = TestSignerServer::spawn().await?;
    server.put_role("web", TestRoleBuilder::new().with_ttl(600)).await?;

    let response = server
        .client()
        .post(format!("{}/sign/web", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    let token = body["token"].as_str().unwrap_or_default().to_string();
    token.assert_valid_jwt().assert_lifetime(600);

    Ok(())
}

#[tokio::test]
async fn test_malformed_sign_body_keeps_error_list_shape() -> Result<(), anyhow::Error> {
    let server = TestSignerServer::spawn().await?;
    server.put_role("web", TestRoleBuilder::new()).await?;

    let response = server
        .client()
        .post(format!("{}/sign/web", server.url()))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert!(
        body["errors"][0]
            .as_str()
            .is_some_and(|e| e.starts_with("request body: ")),
        "{body}"
    );

    Ok(())
}
