use crate::claims::ClaimsComposer;
use crate::errors::SignerError;
use crate::models::SignResponse;
use crate::observability::metrics;
use crate::services::key_manager::KeyManager;
use crate::services::role_service;
use crate::storage::KeyValueStore;
use std::time::Instant;
use tracing::instrument;

/// Issue a token for `role_name`.
///
/// Loads the role, composes and validates claims, then signs with the
/// current key. `token_id` becomes the `jti` claim.
#[instrument(skip_all, fields(role = %role_name))]
pub async fn issue_token(
    store: &dyn KeyValueStore,
    composer: &ClaimsComposer,
    key_manager: &KeyManager,
    role_name: &str,
    raw_claims: &str,
    token_id: &str,
) -> Result<SignResponse, SignerError> {
    let start = Instant::now();

    let result = sign(store, composer, key_manager, role_name, raw_claims, token_id).await;

    let status = if result.is_ok() { "success" } else { "error" };
    metrics::record_token_issuance(status, start.elapsed());

    result
}

async fn sign(
    store: &dyn KeyValueStore,
    composer: &ClaimsComposer,
    key_manager: &KeyManager,
    role_name: &str,
    raw_claims: &str,
    token_id: &str,
) -> Result<SignResponse, SignerError> {
    let role = role_service::get_role(store, role_name)
        .await?
        .ok_or(SignerError::RoleNotFound)?;

    let composed = composer.build_claims(&role, raw_claims, token_id)?;

    let key = key_manager.get().await?;
    let token = key.sign(&composed.claims)?;

    tracing::debug!(
        target: "signer.tokens",
        role = %role_name,
        key_id = %key.id(),
        expires = composed.expires.timestamp(),
        "Token issued"
    );

    Ok(SignResponse {
        token,
        expires: composed.expires.timestamp(),
    })
}
