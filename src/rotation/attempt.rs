use serde::Serialize;

use crate::db::KeyId;
use crate::providers::ProviderKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    QuotaExceeded,
    TransientError,
    ValidationError,
}

/// One outbound provider call made while serving a request. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallAttempt {
    pub provider: ProviderKind,
    /// `None` when the configured default key was used.
    pub selected_key_id: Option<KeyId>,
    pub outcome: AttemptOutcome,
    /// Rotations that happened before this attempt.
    pub retries_used: usize,
}

/// Result of `RotatingClient::invoke`.
#[derive(Debug, Clone)]
pub struct Invocation<T> {
    pub output: T,
    /// The output came from the offline fallback, not the provider.
    pub degraded: bool,
    /// Key that produced `output`; `None` for fallback or the default key.
    pub key_id: Option<KeyId>,
    pub attempts: Vec<CallAttempt>,
}

impl<T> Invocation<T> {
    pub fn call_count(&self) -> usize {
        self.attempts.len()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Invocation<U> {
        Invocation {
            output: f(self.output),
            degraded: self.degraded,
            key_id: self.key_id,
            attempts: self.attempts,
        }
    }
}
