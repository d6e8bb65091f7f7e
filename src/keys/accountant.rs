use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use super::store::KeyStore;
use crate::config::UsageConfig;
use crate::db::{ApiKey, KeyId, KeyPatch, UsageUpdate};
use crate::error::ForgeError;

/// Daily quota bookkeeping on top of a `KeyStore`.
#[derive(Clone)]
pub struct UsageAccountant {
    store: Arc<dyn KeyStore>,
    daily_cap: u32,
    reset_after: Duration,
}

impl UsageAccountant {
    pub fn new(store: Arc<dyn KeyStore>, daily_cap: u32, reset_after: Duration) -> Self {
        Self {
            store,
            daily_cap: daily_cap.max(1),
            reset_after,
        }
    }

    pub fn from_config(store: Arc<dyn KeyStore>, cfg: &UsageConfig) -> Self {
        Self::new(store, cfg.daily_cap, cfg.reset_after())
    }

    pub fn daily_cap(&self) -> u32 {
        self.daily_cap
    }

    pub fn store(&self) -> &Arc<dyn KeyStore> {
        &self.store
    }

    /// Count one successful call against key `id`, deactivating it at the cap.
    ///
    /// The store increments in place; no caller snapshot is ever written back.
    pub async fn record_success(&self, id: KeyId) -> Result<UsageUpdate, ForgeError> {
        let update = self.store.record_usage(id, self.daily_cap).await?;

        if update.daily_usage == self.daily_cap {
            info!(
                key.id = id,
                daily_usage = update.daily_usage,
                cap = self.daily_cap,
                "key reached daily cap, deactivated"
            );
        } else {
            debug!(
                key.id = id,
                daily_usage = update.daily_usage,
                active = update.active,
                "usage recorded"
            );
        }
        Ok(update)
    }

    pub fn is_stale(&self, key: &ApiKey, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(key.last_reset) >= self.reset_after
    }

    /// Zero the counter and reactivate `key` once its window has elapsed.
    ///
    /// Returns `false` (and writes nothing) inside the window.
    pub async fn reset_if_stale(
        &self,
        key: &ApiKey,
        now: DateTime<Utc>,
    ) -> Result<bool, ForgeError> {
        if !self.is_stale(key, now) {
            return Ok(false);
        }

        let patch = KeyPatch {
            active: Some(true),
            daily_usage: Some(0),
            last_reset: Some(now),
        };
        self.store.update_key(key.id, patch).await?;

        debug!(
            key.id = key.id,
            provider = %key.provider,
            previous_usage = key.daily_usage,
            "key usage reset"
        );
        Ok(true)
    }

    /// One reset pass over every stored key. Returns how many keys were reset.
    pub async fn reset_stale(&self, now: DateTime<Utc>) -> Result<usize, ForgeError> {
        let keys = self.store.list_keys(None).await?;
        let mut reset = 0;
        for key in &keys {
            if self.reset_if_stale(key, now).await? {
                reset += 1;
            }
        }
        Ok(reset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::MemoryKeyStore;

    fn accountant(store: &Arc<MemoryKeyStore>, cap: u32) -> UsageAccountant {
        UsageAccountant::new(store.clone(), cap, Duration::hours(24))
    }

    #[tokio::test]
    async fn usage_only_grows_until_cap_deactivates() {
        let store = Arc::new(MemoryKeyStore::new());
        let acct = accountant(&store, 5);
        let key = store.insert("content-gen", "k1", 0, true);

        let mut last = 0;
        for expected in 1..=5u32 {
            let update = acct.record_success(key.id).await.expect("recorded");
            assert_eq!(update.daily_usage, expected);
            assert!(update.daily_usage > last);
            last = update.daily_usage;
        }

        let after = store.get(key.id).expect("key present");
        assert_eq!(after.daily_usage, 5);
        assert!(!after.active);
    }

    #[tokio::test]
    async fn key_one_below_cap_is_deactivated_by_next_success() {
        let store = Arc::new(MemoryKeyStore::new());
        let acct = accountant(&store, 50);
        let key = store.insert("content-gen", "k1", 49, true);

        let update = acct.record_success(key.id).await.expect("recorded");
        assert_eq!(
            update,
            UsageUpdate {
                daily_usage: 50,
                active: false
            }
        );
        assert!(!store.get(key.id).expect("present").active);
    }

    #[tokio::test]
    async fn success_counted_after_a_reset_starts_from_zero() {
        let store = Arc::new(MemoryKeyStore::new());
        let acct = accountant(&store, 50);
        let mut key = store.insert("content-gen", "k1", 49, true);
        key.last_reset = Utc::now() - Duration::hours(25);
        store.replace(key.clone());

        // `key` is the pre-reset snapshot a slow request would still hold.
        assert!(acct.reset_if_stale(&key, Utc::now()).await.expect("reset ok"));
        let update = acct.record_success(key.id).await.expect("recorded");

        assert_eq!(
            update,
            UsageUpdate {
                daily_usage: 1,
                active: true
            }
        );
        assert!(store.get(key.id).expect("present").active);
    }

    #[tokio::test]
    async fn unknown_key_is_reported() {
        let store = Arc::new(MemoryKeyStore::new());
        let acct = accountant(&store, 50);

        assert!(matches!(
            acct.record_success(42).await,
            Err(ForgeError::KeyNotFound(42))
        ));
    }

    #[tokio::test]
    async fn reset_is_a_noop_inside_the_window() {
        let store = Arc::new(MemoryKeyStore::new());
        let acct = accountant(&store, 50);
        let key = store.insert("content-gen", "k1", 12, true);

        let reset = acct
            .reset_if_stale(&key, Utc::now())
            .await
            .expect("reset ok");
        assert!(!reset);
        assert_eq!(store.get(key.id).expect("present").daily_usage, 12);
    }

    #[tokio::test]
    async fn reset_after_window_zeroes_and_reactivates_once() {
        let store = Arc::new(MemoryKeyStore::new());
        let acct = accountant(&store, 50);
        let mut key = store.insert("content-gen", "k1", 50, false);
        key.last_reset = Utc::now() - Duration::hours(25);
        store.replace(key.clone());

        let now = Utc::now();
        assert!(acct.reset_if_stale(&key, now).await.expect("reset ok"));

        let refreshed = store.get(key.id).expect("present");
        assert_eq!(refreshed.daily_usage, 0);
        assert!(refreshed.active);
        assert_eq!(refreshed.last_reset, now);

        assert!(!acct.reset_if_stale(&refreshed, now).await.expect("reset ok"));
    }

    #[tokio::test]
    async fn reset_stale_counts_only_expired_keys() {
        let store = Arc::new(MemoryKeyStore::new());
        let acct = accountant(&store, 50);

        let mut old = store.insert("content-gen", "old", 30, true);
        old.last_reset = Utc::now() - Duration::hours(30);
        store.replace(old.clone());
        let fresh = store.insert("image-search", "fresh", 3, true);

        let count = acct.reset_stale(Utc::now()).await.expect("pass ok");
        assert_eq!(count, 1);
        assert_eq!(store.get(old.id).expect("present").daily_usage, 0);
        assert_eq!(store.get(fresh.id).expect("present").daily_usage, 3);
    }

    #[tokio::test]
    async fn write_failures_surface_to_the_caller() {
        let store = Arc::new(MemoryKeyStore::new());
        let acct = accountant(&store, 50);
        let key = store.insert("content-gen", "k1", 0, true);
        store.set_fail_writes(true);

        assert!(acct.record_success(key.id).await.is_err());
        assert_eq!(store.get(key.id).expect("present").daily_usage, 0);
    }
}
