use crate::errors::SignerError;
use crate::models::KeyResponse;
use crate::routes::AppState;
use crate::services::key_service;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Handle public key lookup
///
/// GET /key/:id
///
/// Verifiers resolve a token's `kid` here. 404 once the record is swept.
#[instrument(name = "signer.key.read", skip_all, fields(key_id = %key_id))]
pub async fn read_key(
    State(state): State<Arc<AppState>>,
    Path(key_id): Path<String>,
) -> Result<Json<KeyResponse>, SignerError> {
    key_service::read_public_key(state.store.as_ref(), &key_id)
        .await?
        .map(Json)
        .ok_or(SignerError::NotFound)
}
