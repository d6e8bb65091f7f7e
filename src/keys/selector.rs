use ahash::AHashSet;

use crate::db::{ApiKey, KeyId};

/// Key handed to one provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyLease {
    /// A row from the key store; successful calls are accounted against it.
    Stored(ApiKey),
    /// The configured default secret for a provider that has no stored keys at all.
    Default(String),
}

impl KeyLease {
    pub fn id(&self) -> Option<KeyId> {
        match self {
            Self::Stored(key) => Some(key.id),
            Self::Default(_) => None,
        }
    }

    pub fn secret(&self) -> &str {
        match self {
            Self::Stored(key) => &key.secret,
            Self::Default(secret) => secret,
        }
    }
}

/// Least-used active key not in `tried`; ties go to the lowest id.
///
/// Pure: no IO, no mutation.
pub fn select_key<'a>(keys: &'a [ApiKey], tried: &AHashSet<KeyId>) -> Option<&'a ApiKey> {
    keys.iter()
        .filter(|key| key.active && !tried.contains(&key.id))
        .min_by_key(|key| (key.daily_usage, key.id))
}
