use crate::errors::SignerError;
use crate::models::{KeyResponse, PublicKeyRecord};
use crate::storage::{self, KeyValueStore};
use tracing::instrument;

/// Look up the public key a verifier needs for a token's `kid`.
///
/// Returns `None` when no record exists (never generated, or swept).
#[instrument(skip_all, fields(key_id = %key_id))]
pub async fn read_public_key(
    store: &dyn KeyValueStore,
    key_id: &str,
) -> Result<Option<KeyResponse>, SignerError> {
    let record: Option<PublicKeyRecord> =
        storage::get_json(store, &storage::key_path(key_id)).await?;

    Ok(record.map(|record| KeyResponse {
        name: key_id.to_string(),
        public: record.public_pem,
    }))
}
