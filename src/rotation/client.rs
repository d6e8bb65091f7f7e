use ahash::AHashSet;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::attempt::{AttemptOutcome, CallAttempt, Invocation};
use super::error::CallError;
use crate::db::{ApiKey, KeyId};
use crate::keys::{KeyLease, KeyStore, UsageAccountant, select_key};
use crate::providers::ProviderKind;

/// One third-party operation that can run under any key of its provider.
#[async_trait]
pub trait ProviderCall: Send + Sync + 'static {
    type Request: Send + Sync;
    type Output: Send;

    fn provider(&self) -> ProviderKind;

    /// Perform the call with `secret`. Errors must already be classified.
    async fn call(&self, secret: &str, request: &Self::Request)
    -> Result<Self::Output, CallError>;

    /// Offline substitute. Must not touch the network.
    fn fallback(&self, request: &Self::Request) -> Self::Output;
}

/// Select → call → rotate on quota → fall back, around a single `ProviderCall`.
///
/// Holds no per-request state; the set of tried keys lives inside `invoke`.
pub struct RotatingClient<P> {
    call: P,
    store: Arc<dyn KeyStore>,
    accountant: UsageAccountant,
    max_rotations: usize,
    default_secret: Option<String>,
}

impl<P: ProviderCall> RotatingClient<P> {
    pub fn new(call: P, accountant: UsageAccountant, max_rotations: usize) -> Self {
        Self {
            call,
            store: accountant.store().clone(),
            accountant,
            max_rotations,
            default_secret: None,
        }
    }

    /// Secret used when the store holds no key at all for this provider.
    #[must_use]
    pub fn with_default_secret(mut self, secret: Option<String>) -> Self {
        self.default_secret = secret.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn provider(&self) -> ProviderKind {
        self.call.provider()
    }

    pub fn inner(&self) -> &P {
        &self.call
    }

    /// Run `request` against the provider.
    ///
    /// Never returns `CallError::Quota`: quota on every tried key ends in the fallback.
    pub async fn invoke(&self, request: &P::Request) -> Result<Invocation<P::Output>, CallError> {
        let provider = self.call.provider();
        let mut tried: AHashSet<KeyId> = AHashSet::new();
        let mut attempts: Vec<CallAttempt> = Vec::new();

        let Some(mut lease) = self.select(provider, &tried).await else {
            return Ok(self.fall_back(request, attempts));
        };

        loop {
            let retries_used = attempts.len();
            debug!(
                provider = %provider,
                key.id = ?lease.id(),
                attempt = retries_used + 1,
                "calling provider"
            );

            match self.call.call(lease.secret(), request).await {
                Ok(output) => {
                    attempts.push(CallAttempt {
                        provider,
                        selected_key_id: lease.id(),
                        outcome: AttemptOutcome::Success,
                        retries_used,
                    });
                    let key_id = lease.id();
                    if let KeyLease::Stored(key) = lease {
                        self.spawn_accounting(key);
                    }
                    return Ok(Invocation {
                        output,
                        degraded: false,
                        key_id,
                        attempts,
                    });
                }
                Err(err) => {
                    attempts.push(CallAttempt {
                        provider,
                        selected_key_id: lease.id(),
                        outcome: err.outcome(),
                        retries_used,
                    });

                    if !err.is_quota() {
                        warn!(
                            provider = %provider,
                            key.id = ?lease.id(),
                            error = %err,
                            "provider call failed"
                        );
                        return Err(err);
                    }

                    warn!(
                        provider = %provider,
                        key.id = ?lease.id(),
                        error = %err,
                        "provider quota hit"
                    );

                    // The default key has no siblings to rotate to.
                    let Some(id) = lease.id() else {
                        return Ok(self.fall_back(request, attempts));
                    };
                    tried.insert(id);

                    if retries_used >= self.max_rotations {
                        return Ok(self.fall_back(request, attempts));
                    }
                    match self.select(provider, &tried).await {
                        Some(next) => {
                            info!(provider = %provider, from = id, to = ?next.id(), "rotating key");
                            lease = next;
                        }
                        None => return Ok(self.fall_back(request, attempts)),
                    }
                }
            }
        }
    }

    async fn select(&self, provider: ProviderKind, tried: &AHashSet<KeyId>) -> Option<KeyLease> {
        let keys = match self.store.list_active_keys(provider.as_str()).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(
                    provider = %provider,
                    error = %e,
                    "key store unreadable, treating as no eligible key"
                );
                return None;
            }
        };

        if let Some(key) = select_key(&keys, tried) {
            return Some(KeyLease::Stored(key.clone()));
        }

        // The default key only stands in for a provider that was never seeded.
        if !keys.is_empty() || !tried.is_empty() {
            return None;
        }
        let secret = self.default_secret.as_ref()?;
        match self.store.list_keys(Some(provider.as_str())).await {
            Ok(all) if all.is_empty() => Some(KeyLease::Default(secret.clone())),
            Ok(_) => None,
            Err(e) => {
                warn!(
                    provider = %provider,
                    error = %e,
                    "key store unreadable, treating as no eligible key"
                );
                None
            }
        }
    }

    fn spawn_accounting(&self, key: ApiKey) {
        let accountant = self.accountant.clone();
        tokio::spawn(async move {
            if let Err(e) = accountant.record_success(key.id).await {
                warn!(
                    key.id = key.id,
                    provider = %key.provider,
                    error = %e,
                    "usage accounting failed"
                );
            }
        });
    }

    fn fall_back(
        &self,
        request: &P::Request,
        attempts: Vec<CallAttempt>,
    ) -> Invocation<P::Output> {
        info!(
            provider = %self.call.provider(),
            attempts = attempts.len(),
            "no provider key could serve the request, using fallback"
        );
        Invocation {
            output: self.call.fallback(request),
            degraded: true,
            key_id: None,
            attempts,
        }
    }
}
