use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::store::KeyStore;
use crate::db::{ApiKey, KeyId, KeyPatch, NewApiKey, UsageUpdate};
use crate::error::ForgeError;

/// In-process `KeyStore` used by tests and by embedders that do not want SQLite.
///
/// Reads and writes can be made to fail on demand to exercise the degraded paths.
#[derive(Default)]
pub struct MemoryKeyStore {
    inner: Mutex<MemoryInner>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

#[derive(Default)]
struct MemoryInner {
    next_id: KeyId,
    keys: Vec<ApiKey>,
}

impl MemoryInner {
    fn push(&mut self, provider: &str, secret: &str, daily_usage: u32, active: bool) -> ApiKey {
        let now = Utc::now();
        self.next_id += 1;
        let key = ApiKey {
            id: self.next_id,
            provider: provider.to_string(),
            secret: secret.to_string(),
            active,
            daily_usage,
            last_reset: now,
            created_at: now,
            updated_at: now,
        };
        self.keys.push(key.clone());
        key
    }
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully specified row, bypassing the `create_key` defaults.
    pub fn insert(&self, provider: &str, secret: &str, daily_usage: u32, active: bool) -> ApiKey {
        self.lock().push(provider, secret, daily_usage, active)
    }

    /// Current row for `id`, if any.
    pub fn get(&self, id: KeyId) -> Option<ApiKey> {
        self.lock().keys.iter().find(|k| k.id == id).cloned()
    }

    /// Overwrite a row in place, for tests that need to backdate `last_reset`.
    pub fn replace(&self, key: ApiKey) {
        let mut inner = self.lock();
        if let Some(slot) = inner.keys.iter_mut().find(|k| k.id == key.id) {
            *slot = key;
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_read(&self) -> Result<(), ForgeError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ForgeError::UnexpectedError(
                "memory store read failure".to_string(),
            ));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), ForgeError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ForgeError::UnexpectedError(
                "memory store write failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn list_active_keys(&self, provider: &str) -> Result<Vec<ApiKey>, ForgeError> {
        self.check_read()?;
        Ok(self
            .lock()
            .keys
            .iter()
            .filter(|k| k.active && k.provider == provider)
            .cloned()
            .collect())
    }

    async fn list_keys(&self, provider: Option<&str>) -> Result<Vec<ApiKey>, ForgeError> {
        self.check_read()?;
        Ok(self
            .lock()
            .keys
            .iter()
            .filter(|k| provider.is_none_or(|p| k.provider == p))
            .cloned()
            .collect())
    }

    async fn get_key(&self, id: KeyId) -> Result<ApiKey, ForgeError> {
        self.check_read()?;
        self.get(id).ok_or(ForgeError::KeyNotFound(id))
    }

    async fn get_key_by_secret(&self, secret: &str) -> Result<Option<ApiKey>, ForgeError> {
        self.check_read()?;
        Ok(self.lock().keys.iter().find(|k| k.secret == secret).cloned())
    }

    async fn update_key(&self, id: KeyId, patch: KeyPatch) -> Result<(), ForgeError> {
        self.check_write()?;
        let mut inner = self.lock();
        let key = inner
            .keys
            .iter_mut()
            .find(|k| k.id == id)
            .ok_or(ForgeError::KeyNotFound(id))?;
        if let Some(active) = patch.active {
            key.active = active;
        }
        if let Some(daily_usage) = patch.daily_usage {
            key.daily_usage = daily_usage;
        }
        if let Some(last_reset) = patch.last_reset {
            key.last_reset = last_reset;
        }
        key.updated_at = Utc::now();
        Ok(())
    }

    async fn record_usage(&self, id: KeyId, cap: u32) -> Result<UsageUpdate, ForgeError> {
        self.check_write()?;
        let mut inner = self.lock();
        let key = inner
            .keys
            .iter_mut()
            .find(|k| k.id == id)
            .ok_or(ForgeError::KeyNotFound(id))?;
        key.daily_usage = key.daily_usage.saturating_add(1);
        if key.daily_usage >= cap {
            key.active = false;
        }
        key.updated_at = Utc::now();
        Ok(UsageUpdate {
            daily_usage: key.daily_usage,
            active: key.active,
        })
    }

    async fn create_key(&self, new_key: NewApiKey) -> Result<ApiKey, ForgeError> {
        self.check_write()?;
        let mut inner = self.lock();
        if let Some(existing) = inner.keys.iter().find(|k| k.secret == new_key.secret) {
            return Ok(existing.clone());
        }
        Ok(inner.push(&new_key.provider, &new_key.secret, 0, true))
    }

    async fn delete_key(&self, id: KeyId) -> Result<bool, ForgeError> {
        self.check_write()?;
        let mut inner = self.lock();
        let before = inner.keys.len();
        inner.keys.retain(|k| k.id != id);
        Ok(inner.keys.len() != before)
    }
}
