use async_trait::async_trait;

use crate::db::{ApiKey, KeyId, KeyPatch, NewApiKey, UsageUpdate};
use crate::error::ForgeError;

/// Persistence seam for provider keys.
///
/// Implementations must serialize updates to a single record; nothing above this
/// trait takes a lock.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Active keys of `provider`, ordered by id.
    async fn list_active_keys(&self, provider: &str) -> Result<Vec<ApiKey>, ForgeError>;

    /// Every key, active or not, optionally limited to one provider. Ordered by id.
    async fn list_keys(&self, provider: Option<&str>) -> Result<Vec<ApiKey>, ForgeError>;

    /// Fails with `ForgeError::KeyNotFound` when no row has `id`.
    async fn get_key(&self, id: KeyId) -> Result<ApiKey, ForgeError>;

    async fn get_key_by_secret(&self, secret: &str) -> Result<Option<ApiKey>, ForgeError>;

    /// Fails with `ForgeError::KeyNotFound` when no row has `id`.
    async fn update_key(&self, id: KeyId, patch: KeyPatch) -> Result<(), ForgeError>;

    /// Increment the stored counter by one in a single step and clear `active` once it
    /// reaches `cap`. Returns the counter state after the write.
    async fn record_usage(&self, id: KeyId, cap: u32) -> Result<UsageUpdate, ForgeError>;

    /// Returns the stored row. An existing secret yields the existing key.
    async fn create_key(&self, new_key: NewApiKey) -> Result<ApiKey, ForgeError>;

    async fn delete_key(&self, id: KeyId) -> Result<bool, ForgeError>;
}
