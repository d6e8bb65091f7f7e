mod content_gen;
mod image_search;

pub use content_gen::{ContentGenConfig, ContentGenResolvedConfig};
pub use image_search::{ImageSearchConfig, ImageSearchResolvedConfig};

use serde::{Deserialize, Serialize};
use url::Url;

/// Global provider defaults (used when provider-level config is unset).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderDefaults {
    /// Optional upstream HTTP proxy. If set, used for reqwest clients.
    /// TOML: `providers.defaults.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Whole-request timeout for upstream calls, in seconds.
    /// TOML: `providers.defaults.request_timeout_secs`. Default: `60`.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// TCP connect timeout for upstream calls, in seconds.
    /// TOML: `providers.defaults.connect_timeout_secs`. Default: `10`.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Retries for transport failures (connect/timeout) inside a single attempt.
    /// TOML: `providers.defaults.network_retry_times`. Default: `1`.
    #[serde(default = "default_network_retry_times")]
    pub network_retry_times: usize,
}

impl Default for ProviderDefaults {
    fn default() -> Self {
        Self {
            proxy: None,
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            network_retry_times: default_network_retry_times(),
        }
    }
}

/// All provider configurations.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProvidersConfig {
    /// Global defaults for providers (overridden per provider if set).
    #[serde(default)]
    pub defaults: ProviderDefaults,

    /// Generative content provider (Gemini).
    #[serde(default)]
    pub content_gen: ContentGenConfig,

    /// Stock image search provider (Unsplash).
    #[serde(default)]
    pub image_search: ImageSearchConfig,
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_network_retry_times() -> usize {
    1
}
