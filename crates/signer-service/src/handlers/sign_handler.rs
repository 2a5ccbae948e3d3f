use crate::errors::SignerError;
use crate::models::{SignRequest, SignResponse};
use crate::routes::AppState;
use crate::services::token_service;
use crate::handlers::optional_json;
use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Handle sign request
///
/// POST /sign/:name
///
/// Body: `{"claims": "<JSON object as a string>"}`, `claims` optional. The
/// body itself may be omitted.
/// Each request gets a fresh UUIDv4 as its `jti`.
///
/// Claims and the issued token are never logged.
#[instrument(name = "signer.sign", skip_all, fields(role = %name, status))]
pub async fn sign(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<SignResponse>, SignerError> {
    let request: SignRequest = optional_json(&body)?;
    let token_id = Uuid::new_v4().to_string();
    let raw_claims = request.claims.unwrap_or_default();

    let result = token_service::issue_token(
        state.store.as_ref(),
        &state.composer,
        &state.key_manager,
        &name,
        &raw_claims,
        &token_id,
    )
    .await;

    let status = if result.is_ok() { "success" } else { "error" };
    tracing::Span::current().record("status", status);

    result.map(Json)
}
