use serde::{Deserialize, Serialize};
use url::Url;

use super::ProviderDefaults;

/// Gemini content generation provider configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentGenConfig {
    /// Gemini API base URL.
    /// TOML: `providers.content_gen.api_url`.
    /// Default: `https://generativelanguage.googleapis.com/v1beta/`.
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    /// Model used for every generation request.
    /// TOML: `providers.content_gen.model`. Default: `gemini-2.0-flash`.
    #[serde(default = "default_model")]
    pub model: String,

    /// API keys seeded into the key store at startup.
    /// TOML: `providers.content_gen.secrets`. Default: empty.
    #[serde(default)]
    pub secrets: Vec<String>,

    /// Key used when the store holds no key at all for this provider.
    /// TOML: `providers.content_gen.default_secret`. Default: unset.
    #[serde(default)]
    pub default_secret: Option<String>,

    /// Optional upstream HTTP proxy.
    /// TOML: `providers.content_gen.proxy`. Falls back to `providers.defaults.proxy`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// TOML: `providers.content_gen.request_timeout_secs`.
    /// Falls back to `providers.defaults.request_timeout_secs`.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ContentGenResolvedConfig {
    pub api_url: Url,
    pub model: String,
    pub secrets: Vec<String>,
    pub default_secret: Option<String>,
    pub proxy: Option<Url>,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub network_retry_times: usize,
}

impl ContentGenConfig {
    pub fn resolve(&self, defaults: &ProviderDefaults) -> ContentGenResolvedConfig {
        ContentGenResolvedConfig {
            api_url: self.api_url.clone(),
            model: self.model.clone(),
            secrets: self.secrets.clone(),
            default_secret: self
                .default_secret
                .clone()
                .filter(|s| !s.trim().is_empty()),
            proxy: self.proxy.clone().or_else(|| defaults.proxy.clone()),
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
            connect_timeout_secs: defaults.connect_timeout_secs,
            network_retry_times: defaults.network_retry_times,
        }
    }
}

impl Default for ContentGenConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            model: default_model(),
            secrets: Vec::new(),
            default_secret: None,
            proxy: None,
            request_timeout_secs: None,
        }
    }
}

fn default_api_url() -> Url {
    Url::parse("https://generativelanguage.googleapis.com/v1beta/")
        .expect("valid Gemini API base URL")
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}
