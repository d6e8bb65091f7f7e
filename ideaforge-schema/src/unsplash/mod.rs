//! Unsplash photo search schema (`GET /search/photos`).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsplashSearchResponse {
    #[serde(default)]
    pub total: u64,

    #[serde(default)]
    pub results: Vec<UnsplashPhoto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsplashPhoto {
    pub id: String,

    #[serde(default)]
    pub alt_description: Option<String>,

    pub urls: UnsplashUrls,

    #[serde(default)]
    pub user: Option<UnsplashUser>,

    #[serde(default)]
    pub links: Option<UnsplashLinks>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsplashUrls {
    pub regular: String,

    #[serde(default)]
    pub small: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsplashUser {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsplashLinks {
    #[serde(default)]
    pub html: Option<String>,
}

/// Unsplash error payload: `{"errors": ["Rate Limit Exceeded"]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsplashErrorBody {
    #[serde(default)]
    pub errors: Vec<String>,
}

impl UnsplashErrorBody {
    pub fn joined(&self) -> String {
        if self.errors.is_empty() {
            "upstream error".to_string()
        } else {
            self.errors.join("; ")
        }
    }

    pub fn mentions_rate_limit(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.to_ascii_lowercase().contains("rate limit"))
    }
}
