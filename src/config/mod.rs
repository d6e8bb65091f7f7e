mod basic;
mod blog;
mod providers;
mod usage;

pub use basic::BasicConfig;
pub use blog::BlogConfig;
pub use providers::{
    ContentGenConfig, ContentGenResolvedConfig, ImageSearchConfig, ImageSearchResolvedConfig,
    ProviderDefaults, ProvidersConfig,
};
pub use usage::UsageConfig;

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::LazyLock};

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Upstream provider settings (see `providers` table in config.toml).
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Key quota and rotation settings (see `usage` table in config.toml).
    #[serde(default)]
    pub usage: UsageConfig,

    /// Auto-blog scheduler settings (see `blog` table in config.toml).
    #[serde(default)]
    pub blog: BlogConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";

impl Config {
    /// Builds a Figment that merges defaults and a config TOML file.
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        }
    }

    /// Loads configuration by merging defaults and `config.toml` if present.
    ///
    /// Does not validate `basic.admin_key`; the binary goes through `from_toml()`.
    pub fn from_optional_toml() -> Self {
        Self::figment().extract().unwrap_or_else(|err| {
            panic!("failed to extract configuration (defaults + optional config.toml): {err}")
        })
    }

    /// Loads configuration from the TOML file (with defaults) and validates required fields.
    pub fn from_toml() -> Self {
        if !PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            panic!("config file not found: {DEFAULT_CONFIG_FILE}");
        }
        let cfg: Self = Self::figment().extract().unwrap_or_else(|err| {
            panic!("failed to extract configuration from {DEFAULT_CONFIG_FILE}: {err}")
        });
        if cfg.basic.admin_key.trim().is_empty() {
            panic!("basic.admin_key must be set and non-empty");
        }
        cfg
    }

    pub fn content_gen(&self) -> ContentGenResolvedConfig {
        self.providers.content_gen.resolve(&self.providers.defaults)
    }

    pub fn image_search(&self) -> ImageSearchResolvedConfig {
        self.providers.image_search.resolve(&self.providers.defaults)
    }
}

/// Global, lazily-initialized configuration instance.
pub static CONFIG: LazyLock<Config> = LazyLock::new(Config::from_optional_toml);

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::Toml;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.basic.listen_port, 8188);
        assert_eq!(cfg.usage.daily_cap, 50);
        assert_eq!(cfg.usage.max_rotations, 1);
        assert_eq!(cfg.usage.reset_after_secs, 24 * 60 * 60);
        assert!(!cfg.blog.enabled);
        assert_eq!(cfg.content_gen().request_timeout_secs, 60);
    }

    #[test]
    fn toml_overrides_merge_over_defaults() {
        let toml = r#"
            [basic]
            admin_key = 12345

            [providers.defaults]
            request_timeout_secs = 15

            [providers.content_gen]
            secrets = ["k1", "k2"]
            request_timeout_secs = 90

            [usage]
            daily_cap = 10
        "#;

        let cfg: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(toml))
            .extract()
            .expect("valid config");

        assert_eq!(cfg.basic.admin_key, "12345");
        assert_eq!(cfg.usage.daily_cap, 10);
        assert_eq!(cfg.usage.max_rotations, 1);

        let content = cfg.content_gen();
        assert_eq!(content.secrets, vec!["k1".to_string(), "k2".to_string()]);
        assert_eq!(content.request_timeout_secs, 90);

        let image = cfg.image_search();
        assert_eq!(image.request_timeout_secs, 15);
        assert!(image.secrets.is_empty());
    }
}
