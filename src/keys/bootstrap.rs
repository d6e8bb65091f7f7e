use tracing::info;

use super::store::KeyStore;
use crate::db::NewApiKey;
use crate::error::ForgeError;
use crate::providers::ProviderKind;

/// Seed configured secrets into the store. Returns how many keys were new.
///
/// Blank entries are skipped and secrets already present are left untouched, so this can
/// run on every start.
pub async fn seed_keys(
    store: &dyn KeyStore,
    provider: ProviderKind,
    secrets: &[String],
) -> Result<usize, ForgeError> {
    let mut created = 0;
    for secret in secrets.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if store.get_key_by_secret(secret).await?.is_some() {
            continue;
        }
        let key = store
            .create_key(NewApiKey {
                provider: provider.as_str().to_string(),
                secret: secret.to_string(),
            })
            .await?;
        info!(provider = %provider, key.id = key.id, "seeded key from config");
        created += 1;
    }
    Ok(created)
}
