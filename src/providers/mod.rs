pub mod content_gen;
pub mod image_search;

mod bootstrap;
mod policy;
mod upstream_retry;

pub use bootstrap::Providers;
pub use policy::{UpstreamErrorBody, classify_status};

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Logical third-party capability. The string form is what the key store records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    ContentGen,
    ImageSearch,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::ContentGen, ProviderKind::ImageSearch];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::ContentGen => "content-gen",
            ProviderKind::ImageSearch => "image-search",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err("provider must not be empty".to_string());
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| format!("unknown provider `{name}`"))
    }
}
