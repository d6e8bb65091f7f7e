use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::models::KeyId;
use crate::error::ForgeError;

/// Abstraction for applying a patch envelope to the database.
#[async_trait]
pub trait DbPatchable {
    async fn apply_patch(&self, pool: &SqlitePool) -> Result<(), ForgeError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPatch {
    /// `None` => do not change; `Some(v)` => update
    pub active: Option<bool>,
    pub daily_usage: Option<u32>,
    pub last_reset: Option<DateTime<Utc>>,
}

impl KeyPatch {
    pub fn is_empty(&self) -> bool {
        self.active.is_none() && self.daily_usage.is_none() && self.last_reset.is_none()
    }
}

/// `KeyPatch` addressed to one row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyUpdate {
    pub id: KeyId,
    pub patch: KeyPatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewApiKey {
    pub provider: String,
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBlogPost {
    /// Preferred slug; a numeric suffix is appended when it is taken.
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub topic: String,
    pub cover_url: Option<String>,
    pub cover_credit: Option<String>,
    pub degraded: bool,
}
