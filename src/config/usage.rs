use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-key quota accounting and rotation bounds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UsageConfig {
    /// Successful calls a key may serve per window before it is deactivated.
    /// TOML: `usage.daily_cap`. Default: `50`.
    #[serde(default = "default_daily_cap")]
    pub daily_cap: u32,

    /// Extra attempts under a different key after a quota/overload error.
    /// TOML: `usage.max_rotations`. Default: `1` (two attempts in total).
    #[serde(default = "default_max_rotations")]
    pub max_rotations: usize,

    /// Age of `last_reset` after which a key's counter is zeroed.
    /// TOML: `usage.reset_after_secs`. Default: `86400`.
    #[serde(default = "default_reset_after_secs")]
    pub reset_after_secs: u64,

    /// How often the reset job scans the key store.
    /// TOML: `usage.poll_interval_secs`. Default: `3600`.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            daily_cap: default_daily_cap(),
            max_rotations: default_max_rotations(),
            reset_after_secs: default_reset_after_secs(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl UsageConfig {
    pub fn reset_after(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.reset_after_secs).unwrap_or(i64::MAX))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

fn default_daily_cap() -> u32 {
    50
}

fn default_max_rotations() -> usize {
    1
}

fn default_reset_after_secs() -> u64 {
    24 * 60 * 60
}

fn default_poll_interval_secs() -> u64 {
    60 * 60
}
