use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub type KeyId = i64;

/// One provider credential with its usage counter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct ApiKey {
    pub id: KeyId,
    pub provider: String,
    pub secret: String,
    pub active: bool,
    pub daily_usage: u32,
    pub last_reset: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Counter state after one recorded success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct UsageUpdate {
    pub daily_usage: u32,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct BlogPost {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub topic: String,
    pub cover_url: Option<String>,
    pub cover_credit: Option<String>,
    pub degraded: bool,
    pub created_at: DateTime<Utc>,
}
