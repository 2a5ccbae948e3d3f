use crate::errors::SignerError;
use crate::models::{ListResponse, RoleResponse, RoleWriteRequest};
use crate::routes::AppState;
use crate::services::role_service;
use crate::handlers::optional_json;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::instrument;

/// GET /role
#[instrument(name = "signer.role.list", skip_all)]
pub async fn list_roles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListResponse>, SignerError> {
    let keys = role_service::list_roles(state.store.as_ref()).await?;
    Ok(Json(ListResponse { keys }))
}

/// GET /role/:name
#[instrument(name = "signer.role.read", skip_all, fields(role = %name))]
pub async fn read_role(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<RoleResponse>, SignerError> {
    role_service::read_role(state.store.as_ref(), &name)
        .await?
        .map(Json)
        .ok_or(SignerError::NotFound)
}

/// POST|PUT /role/:name
///
/// Creates or replaces the role. An omitted body writes an empty role. 400
/// with the sorted validation errors if the defaults, overrides or schema are
/// rejected.
#[instrument(name = "signer.role.write", skip_all, fields(role = %name))]
pub async fn write_role(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<StatusCode, SignerError> {
    let request: RoleWriteRequest = optional_json(&body)?;
    role_service::write_role(state.store.as_ref(), &state.composer, &name, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /role/:name
#[instrument(name = "signer.role.delete", skip_all, fields(role = %name))]
pub async fn delete_role(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, SignerError> {
    role_service::delete_role(state.store.as_ref(), &name).await?;
    Ok(StatusCode::NO_CONTENT)
}
