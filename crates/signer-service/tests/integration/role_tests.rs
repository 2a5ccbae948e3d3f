//! Integration tests for role administration over HTTP

use reqwest::StatusCode;
use serde_json::{json, Value};
use signer_test_utils::{TestRoleBuilder, TestSignerServer};

async fn errors_of(response: reqwest::Response) -> Result<Vec<String>, anyhow::Error> {
    let body: Value = response.json().await?;
    Ok(body["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default())
}

#[tokio::test]
async fn test_role_crud_round_trip() -> Result<(), anyhow::Error> {
    let server = TestSignerServer::spawn().await?;
    let client = server.client();

    server
        .put_role(
            "web",
            TestRoleBuilder::new()
                .with_defaults(json!({"team": "infra"}))
                .with_overrides(json!({"aud": "billing"}))
                .with_ttl(600),
        )
        .await?;
    server.put_role("api", TestRoleBuilder::new()).await?;

    // List is sorted
    let list: Value = client
        .get(format!("{}/role", server.url()))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(list["keys"], json!(["api", "web"]));

    // Read returns the stored documents verbatim
    let role: Value = client
        .get(format!("{}/role/web", server.url()))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(role["name"], "web");
    assert_eq!(role["ttl"], 600);
    assert_eq!(
        serde_json::from_str::<Value>(role["defaults"].as_str().unwrap_or_default())?,
        json!({"team": "infra"})
    );

    // Delete, then read is 404
    let response = client
        .delete(format!("{}/role/web", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(format!("{}/role/web", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_put_replaces_role() -> Result<(), anyhow::Error> {
    let server = TestSignerServer::spawn().await?;

    server
        .put_role(
            "web",
            TestRoleBuilder::new()
                .with_overrides(json!({"aud": "billing"}))
                .with_ttl(60),
        )
        .await?;
    server.put_role("web", TestRoleBuilder::new()).await?;

    let role: Value = server
        .client()
        .get(format!("{}/role/web", server.url()))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(role["overrides"], "");
    assert_eq!(role["ttl"], 3600);

    Ok(())
}

#[tokio::test]
async fn test_ttl_is_clamped() -> Result<(), anyhow::Error> {
    let server = TestSignerServer::spawn().await?;
    server
        .put_role("long", TestRoleBuilder::new().with_ttl(10 * 86_400))
        .await?;

    let role: Value = server
        .client()
        .get(format!("{}/role/long", server.url()))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(role["ttl"], 86_400);

    Ok(())
}

/// Invalid role configuration is rejected with every error, sorted, and
/// nothing is stored.
#[tokio::test]
async fn test_invalid_role_returns_sorted_errors() -> Result<(), anyhow::Error> {
    let server = TestSignerServer::spawn().await?;

    let response = server
        .client()
        .post(format!("{}/role/bad", server.url()))
        .json(
            &TestRoleBuilder::new()
                .with_overrides(json!({"jti": "x", "exp": 1}))
                .build(),
        )
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let errors = errors_of(response).await?;
    assert_eq!(errors.len(), 2, "Expected one error per reserved claim: {errors:?}");
    assert!(errors[0].starts_with("/exp: "), "{errors:?}");
    assert!(errors[1].starts_with("/jti: "), "{errors:?}");

    let response = server
        .client()
        .get(format!("{}/role/bad", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_malformed_schema_is_bad_request() -> Result<(), anyhow::Error> {
    let server = TestSignerServer::spawn().await?;

    let response = server
        .client()
        .post(format!("{}/role/bad", server.url()))
        .json(&TestRoleBuilder::new().with_raw_schema("{not json").build())
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let errors = errors_of(response).await?;
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("schema: "), "{errors:?}");

    Ok(())
}

#[tokio::test]
async fn test_invalid_role_name_is_bad_request() -> Result<(), anyhow::Error> {
    let server = TestSignerServer::spawn().await?;

    let response = server
        .client()
        .post(format!("{}/role/-web", server.url()))
        .json(&TestRoleBuilder::new().build())
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_role_write_without_body_creates_default_role() -> Result<(), anyhow::Error> {
    let server = TestSignerServer::spawn().await?;

    let response = server
        .client()
        .post(format!("{}/role/bare", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let role: Value = server
        .client()
        .get(format!("{}/role/bare", server.url()))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(role["ttl"], 3600);
    assert_eq!(role["schema"], "");

    Ok(())
}

/// Schemas referencing remote or local-file documents are rejected without
/// being fetched, and the server keeps serving.
#[tokio::test]
async fn test_external_schema_refs_are_rejected() -> Result<(), anyhow::Error> {
    let server = TestSignerServer::spawn().await?;

    for reference in ["http://127.0.0.1:9/remote.json", "file:///etc/hostname"] {
        let response = server
            .client()
            .post(format!("{}/role/remote", server.url()))
            .json(&TestRoleBuilder::new().with_schema(json!({"$ref": reference})).build())
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{reference}");
        let errors = errors_of(response).await?;
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].starts_with("schema: "), "{errors:?}");
    }

    let response = server
        .client()
        .get(format!("{}/health", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_schema_meta_errors_are_all_reported() -> Result<(), anyhow::Error> {
    let server = TestSignerServer::spawn().await?;

    let response = server
        .client()
        .post(format!("{}/role/typo", server.url()))
        .json(
            &TestRoleBuilder::new()
                .with_schema(json!({"type": 12, "minLength": "three"}))
                .build(),
        )
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let errors = errors_of(response).await?;
    assert!(errors.len() >= 2, "{errors:?}");
    assert!(errors.iter().any(|e| e.starts_with("schema/type: ")), "{errors:?}");
    assert!(errors.iter().any(|e| e.starts_with("schema/minLength: ")), "{errors:?}");

    Ok(())
}
