use serde::{Deserialize, Serialize};
use url::Url;

use super::ProviderDefaults;

/// Unsplash image search provider configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageSearchConfig {
    /// TOML: `providers.image_search.api_url`. Default: `https://api.unsplash.com/`.
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    /// Access keys seeded into the key store at startup.
    /// TOML: `providers.image_search.secrets`. Default: empty.
    #[serde(default)]
    pub secrets: Vec<String>,

    /// Key used when the store holds no key at all for this provider.
    /// TOML: `providers.image_search.default_secret`. Default: unset.
    #[serde(default)]
    pub default_secret: Option<String>,

    /// Seconds a successful search result stays cached per query.
    /// TOML: `providers.image_search.cache_ttl_secs`. Default: `3600`.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// TOML: `providers.image_search.proxy`. Falls back to `providers.defaults.proxy`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// TOML: `providers.image_search.request_timeout_secs`.
    /// Falls back to `providers.defaults.request_timeout_secs`.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ImageSearchResolvedConfig {
    pub api_url: Url,
    pub secrets: Vec<String>,
    pub default_secret: Option<String>,
    pub cache_ttl_secs: u64,
    pub proxy: Option<Url>,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub network_retry_times: usize,
}

impl ImageSearchConfig {
    pub fn resolve(&self, defaults: &ProviderDefaults) -> ImageSearchResolvedConfig {
        ImageSearchResolvedConfig {
            api_url: self.api_url.clone(),
            secrets: self.secrets.clone(),
            default_secret: self
                .default_secret
                .clone()
                .filter(|s| !s.trim().is_empty()),
            cache_ttl_secs: self.cache_ttl_secs,
            proxy: self.proxy.clone().or_else(|| defaults.proxy.clone()),
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
            connect_timeout_secs: defaults.connect_timeout_secs,
            network_retry_times: defaults.network_retry_times,
        }
    }
}

impl Default for ImageSearchConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            secrets: Vec::new(),
            default_secret: None,
            cache_ttl_secs: default_cache_ttl_secs(),
            proxy: None,
            request_timeout_secs: None,
        }
    }
}

fn default_api_url() -> Url {
    Url::parse("https://api.unsplash.com/").expect("valid Unsplash API base URL")
}

fn default_cache_ttl_secs() -> u64 {
    60 * 60
}
