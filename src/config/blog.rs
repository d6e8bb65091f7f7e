use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Auto-blog scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlogConfig {
    /// Run the scheduler at all.
    /// TOML: `blog.enabled`. Default: `false`.
    #[serde(default)]
    pub enabled: bool,

    /// Seconds between two generated posts.
    /// TOML: `blog.interval_secs`. Default: `86400`.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Topics queued at startup.
    /// TOML: `blog.topics`. Default: empty.
    #[serde(default)]
    pub topics: Vec<String>,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_interval_secs(),
            topics: Vec::new(),
        }
    }
}

impl BlogConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

fn default_interval_secs() -> u64 {
    24 * 60 * 60
}
