use async_trait::async_trait;

use crate::db::actor::DbActorHandle;
use crate::db::models::{ApiKey, KeyId, UsageUpdate};
use crate::db::patch::{KeyPatch, KeyUpdate, NewApiKey};
use crate::error::ForgeError;
use crate::keys::KeyStore;

#[async_trait]
impl KeyStore for DbActorHandle {
    async fn list_active_keys(&self, provider: &str) -> Result<Vec<ApiKey>, ForgeError> {
        DbActorHandle::list_active_keys(self, provider).await
    }

    async fn list_keys(&self, provider: Option<&str>) -> Result<Vec<ApiKey>, ForgeError> {
        DbActorHandle::list_keys(self, provider).await
    }

    async fn get_key(&self, id: KeyId) -> Result<ApiKey, ForgeError> {
        DbActorHandle::get_key(self, id).await
    }

    async fn get_key_by_secret(&self, secret: &str) -> Result<Option<ApiKey>, ForgeError> {
        DbActorHandle::get_key_by_secret(self, secret).await
    }

    async fn update_key(&self, id: KeyId, patch: KeyPatch) -> Result<(), ForgeError> {
        DbActorHandle::update_key(self, KeyUpdate { id, patch }).await
    }

    async fn record_usage(&self, id: KeyId, cap: u32) -> Result<UsageUpdate, ForgeError> {
        DbActorHandle::record_usage(self, id, cap).await
    }

    async fn create_key(&self, new_key: NewApiKey) -> Result<ApiKey, ForgeError> {
        DbActorHandle::create_key(self, new_key).await
    }

    async fn delete_key(&self, id: KeyId) -> Result<bool, ForgeError> {
        DbActorHandle::delete_key(self, id).await
    }
}
