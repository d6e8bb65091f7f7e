//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `api_keys` table (one provider credential per row, with its daily usage counter)
/// - `blog_posts` table (posts produced by the auto-blog scheduler)
pub const SQLITE_INIT: &str = r"
-- ---------------------------------------------------------------------------
-- Provider API keys. AUTOINCREMENT keeps ids in insertion order even after deletes.
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS api_keys (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    provider TEXT NOT NULL,
    secret TEXT NOT NULL UNIQUE,
    active INTEGER NOT NULL DEFAULT 1,
    daily_usage INTEGER NOT NULL DEFAULT 0,
    last_reset TEXT NOT NULL, -- RFC3339
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL  -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_api_keys_provider_active ON api_keys(provider, active);

-- ---------------------------------------------------------------------------
-- Generated blog posts
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS blog_posts (
    id INTEGER PRIMARY KEY NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    excerpt TEXT NOT NULL,
    content TEXT NOT NULL,
    topic TEXT NOT NULL,
    cover_url TEXT NULL,
    cover_credit TEXT NULL,
    degraded INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_blog_posts_created_at ON blog_posts(created_at);
";
