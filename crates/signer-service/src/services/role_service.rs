use crate::claims::ClaimsComposer;
use crate::errors::SignerError;
use crate::models::{Role, RoleResponse, RoleWriteRequest};
use crate::storage::{self, KeyValueStore, ROLE_PREFIX};
use tracing::instrument;

/// Role names: word characters, `-` and `.`, starting and ending with a word
/// character.
pub fn is_valid_role_name(name: &str) -> bool {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';

    let (Some(first), Some(last)) = (name.chars().next(), name.chars().last()) else {
        return false;
    };

    is_word(first) && is_word(last) && name.chars().all(|c| is_word(c) || c == '-' || c == '.')
}

fn check_name(name: &str) -> Result<(), SignerError> {
    if is_valid_role_name(name) {
        Ok(())
    } else {
        Err(SignerError::InvalidInput(format!("Invalid role name: {:?}", name)))
    }
}

/// List role names.
#[instrument(skip_all)]
pub async fn list_roles(store: &dyn KeyValueStore) -> Result<Vec<String>, SignerError> {
    Ok(store.list(ROLE_PREFIX).await?)
}

/// Load a role record.
#[instrument(skip_all, fields(role = %name))]
pub async fn get_role(store: &dyn KeyValueStore, name: &str) -> Result<Option<Role>, SignerError> {
    check_name(name)?;
    Ok(storage::get_json(store, &storage::role_path(name)).await?)
}

/// Read a role for the API.
pub async fn read_role(
    store: &dyn KeyValueStore,
    name: &str,
) -> Result<Option<RoleResponse>, SignerError> {
    Ok(get_role(store, name).await?.map(|role| RoleResponse {
        name: name.to_string(),
        defaults: role.defaults,
        overrides: role.overrides,
        schema: role.schema,
        ttl: role.ttl,
    }))
}

/// Create or replace a role.
///
/// Every field is replaced; omitted documents become empty. The TTL is
/// clamped and the configuration is validated before anything is stored.
#[instrument(skip_all, fields(role = %name))]
pub async fn write_role(
    store: &dyn KeyValueStore,
    composer: &ClaimsComposer,
    name: &str,
    request: RoleWriteRequest,
) -> Result<Role, SignerError> {
    check_name(name)?;

    let role = Role {
        defaults: request.defaults.unwrap_or_default(),
        overrides: request.overrides.unwrap_or_default(),
        schema: request.schema.unwrap_or_default(),
        ttl: Role::clamp_ttl(request.ttl),
    };

    composer.validate_role(&role)?;
    storage::put_json(store, &storage::role_path(name), &role).await?;

    tracing::info!(target: "signer.roles", role = %name, ttl = role.ttl, "Role written");
    Ok(role)
}

/// Delete a role. Deleting an absent role succeeds.
#[instrument(skip_all, fields(role = %name))]
pub async fn delete_role(store: &dyn KeyValueStore, name: &str) -> Result<(), SignerError> {
    check_name(name)?;
    store.delete(&storage::role_path(name)).await?;
    tracing::info!(target: "signer.roles", role = %name, "Role deleted");
    Ok(())
}
