use crate::db::models::{ApiKey, BlogPost, KeyId, UsageUpdate};
use crate::db::patch::{DbPatchable, KeyUpdate, NewApiKey, NewBlogPost};
use crate::db::schema::SQLITE_INIT;
use crate::error::ForgeError;
use chrono::Utc;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

const KEY_COLUMNS: &str =
    "id, provider, secret, active, daily_usage, last_reset, created_at, updated_at";

const POST_COLUMNS: &str =
    "id, slug, title, excerpt, content, topic, cover_url, cover_credit, degraded, created_at";

#[derive(Debug)]
pub enum DbActorMessage {
    /// Insert a key. A secret that already exists returns the stored row unchanged.
    CreateKey(NewApiKey, RpcReplyPort<Result<ApiKey, ForgeError>>),

    /// Active keys of one provider, ordered by id.
    ListActiveKeys(String, RpcReplyPort<Result<Vec<ApiKey>, ForgeError>>),

    /// All keys (optionally filtered by provider), ordered by id.
    ListKeys(Option<String>, RpcReplyPort<Result<Vec<ApiKey>, ForgeError>>),

    GetKey(KeyId, RpcReplyPort<Result<ApiKey, ForgeError>>),

    GetKeyBySecret(String, RpcReplyPort<Result<Option<ApiKey>, ForgeError>>),

    /// Patch a key by id.
    UpdateKey(KeyUpdate, RpcReplyPort<Result<(), ForgeError>>),

    /// Add one to a key's counter, deactivating it once the counter reaches the cap.
    /// Carries the key id and the daily cap.
    RecordUsage(KeyId, u32, RpcReplyPort<Result<UsageUpdate, ForgeError>>),

    /// Returns `true` when a row was removed.
    DeleteKey(KeyId, RpcReplyPort<Result<bool, ForgeError>>),

    CreateBlogPost(NewBlogPost, RpcReplyPort<Result<BlogPost, ForgeError>>),

    /// Most recent posts first.
    ListBlogPosts(u32, RpcReplyPort<Result<Vec<BlogPost>, ForgeError>>),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

impl DbActorHandle {
    pub async fn create_key(&self, new_key: NewApiKey) -> Result<ApiKey, ForgeError> {
        ractor::call!(self.actor, DbActorMessage::CreateKey, new_key)
            .map_err(|e| ForgeError::RactorError(format!("DbActor CreateKey RPC failed: {e}")))?
    }

    pub async fn list_active_keys(&self, provider: &str) -> Result<Vec<ApiKey>, ForgeError> {
        ractor::call!(
            self.actor,
            DbActorMessage::ListActiveKeys,
            provider.to_string()
        )
        .map_err(|e| ForgeError::RactorError(format!("DbActor ListActiveKeys RPC failed: {e}")))?
    }

    pub async fn list_keys(&self, provider: Option<&str>) -> Result<Vec<ApiKey>, ForgeError> {
        ractor::call!(
            self.actor,
            DbActorMessage::ListKeys,
            provider.map(str::to_string)
        )
        .map_err(|e| ForgeError::RactorError(format!("DbActor ListKeys RPC failed: {e}")))?
    }

    pub async fn get_key(&self, id: KeyId) -> Result<ApiKey, ForgeError> {
        ractor::call!(self.actor, DbActorMessage::GetKey, id)
            .map_err(|e| ForgeError::RactorError(format!("DbActor GetKey RPC failed: {e}")))?
    }

    pub async fn get_key_by_secret(&self, secret: &str) -> Result<Option<ApiKey>, ForgeError> {
        ractor::call!(
            self.actor,
            DbActorMessage::GetKeyBySecret,
            secret.to_string()
        )
        .map_err(|e| ForgeError::RactorError(format!("DbActor GetKeyBySecret RPC failed: {e}")))?
    }

    pub async fn update_key(&self, update: KeyUpdate) -> Result<(), ForgeError> {
        ractor::call!(self.actor, DbActorMessage::UpdateKey, update)
            .map_err(|e| ForgeError::RactorError(format!("DbActor UpdateKey RPC failed: {e}")))?
    }

    pub async fn record_usage(&self, id: KeyId, cap: u32) -> Result<UsageUpdate, ForgeError> {
        ractor::call!(self.actor, DbActorMessage::RecordUsage, id, cap).map_err(|e| {
            ForgeError::RactorError(format!("DbActor RecordUsage RPC failed: {e}"))
        })?
    }

    pub async fn delete_key(&self, id: KeyId) -> Result<bool, ForgeError> {
        ractor::call!(self.actor, DbActorMessage::DeleteKey, id)
            .map_err(|e| ForgeError::RactorError(format!("DbActor DeleteKey RPC failed: {e}")))?
    }

    pub async fn create_blog_post(&self, post: NewBlogPost) -> Result<BlogPost, ForgeError> {
        ractor::call!(self.actor, DbActorMessage::CreateBlogPost, post).map_err(|e| {
            ForgeError::RactorError(format!("DbActor CreateBlogPost RPC failed: {e}"))
        })?
    }

    pub async fn list_blog_posts(&self, limit: u32) -> Result<Vec<BlogPost>, ForgeError> {
        ractor::call!(self.actor, DbActorMessage::ListBlogPosts, limit).map_err(|e| {
            ForgeError::RactorError(format!("DbActor ListBlogPosts RPC failed: {e}"))
        })?
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let pool = &state.pool;
        match message {
            DbActorMessage::CreateKey(new_key, reply) => {
                let _ = reply.send(create_key(pool, new_key).await);
            }
            DbActorMessage::ListActiveKeys(provider, reply) => {
                let _ = reply.send(list_active_keys(pool, &provider).await);
            }
            DbActorMessage::ListKeys(provider, reply) => {
                let _ = reply.send(list_keys(pool, provider.as_deref()).await);
            }
            DbActorMessage::GetKey(id, reply) => {
                let _ = reply.send(get_key(pool, id).await);
            }
            DbActorMessage::GetKeyBySecret(secret, reply) => {
                let _ = reply.send(get_key_by_secret(pool, &secret).await);
            }
            DbActorMessage::UpdateKey(update, reply) => {
                let _ = reply.send(update.apply_patch(pool).await);
            }
            DbActorMessage::RecordUsage(id, cap, reply) => {
                let _ = reply.send(record_usage(pool, id, cap).await);
            }
            DbActorMessage::DeleteKey(id, reply) => {
                let _ = reply.send(delete_key(pool, id).await);
            }
            DbActorMessage::CreateBlogPost(post, reply) => {
                let _ = reply.send(create_blog_post(pool, post).await);
            }
            DbActorMessage::ListBlogPosts(limit, reply) => {
                let _ = reply.send(list_blog_posts(pool, limit).await);
            }
        }
        Ok(())
    }
}

async fn create_key(pool: &SqlitePool, new_key: NewApiKey) -> Result<ApiKey, ForgeError> {
    let now = Utc::now();
    // The no-op update makes RETURNING yield the existing row on conflict.
    let sql = format!(
        r"
        INSERT INTO api_keys (provider, secret, active, daily_usage, last_reset, created_at, updated_at)
        VALUES (?, ?, 1, 0, ?, ?, ?)
        ON CONFLICT(secret) DO UPDATE SET secret = excluded.secret
        RETURNING {KEY_COLUMNS}
        "
    );
    let key = sqlx::query_as::<_, ApiKey>(&sql)
        .bind(new_key.provider)
        .bind(new_key.secret)
        .bind(now)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

    debug!(table = "api_keys", id = key.id, provider = %key.provider, "key stored");
    Ok(key)
}

async fn list_active_keys(pool: &SqlitePool, provider: &str) -> Result<Vec<ApiKey>, ForgeError> {
    let sql =
        format!("SELECT {KEY_COLUMNS} FROM api_keys WHERE provider = ? AND active = 1 ORDER BY id");
    let rows = sqlx::query_as::<_, ApiKey>(&sql)
        .bind(provider)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

async fn list_keys(pool: &SqlitePool, provider: Option<&str>) -> Result<Vec<ApiKey>, ForgeError> {
    let sql = format!(
        "SELECT {KEY_COLUMNS} FROM api_keys WHERE (? IS NULL OR provider = ?) ORDER BY id"
    );
    let rows = sqlx::query_as::<_, ApiKey>(&sql)
        .bind(provider)
        .bind(provider)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

async fn get_key(pool: &SqlitePool, id: KeyId) -> Result<ApiKey, ForgeError> {
    let sql = format!("SELECT {KEY_COLUMNS} FROM api_keys WHERE id = ?");
    sqlx::query_as::<_, ApiKey>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ForgeError::KeyNotFound(id))
}

async fn get_key_by_secret(pool: &SqlitePool, secret: &str) -> Result<Option<ApiKey>, ForgeError> {
    let sql = format!("SELECT {KEY_COLUMNS} FROM api_keys WHERE secret = ?");
    let row = sqlx::query_as::<_, ApiKey>(&sql)
        .bind(secret)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

// SET sees the pre-update counter, RETURNING the post-update row.
async fn record_usage(
    pool: &SqlitePool,
    id: KeyId,
    cap: u32,
) -> Result<UsageUpdate, ForgeError> {
    let update = sqlx::query_as::<_, UsageUpdate>(
        r"
        UPDATE api_keys
        SET
            daily_usage = daily_usage + 1,
            active = CASE WHEN daily_usage + 1 >= ? THEN 0 ELSE active END,
            updated_at = ?
        WHERE id = ?
        RETURNING daily_usage, active
        ",
    )
    .bind(cap)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(ForgeError::KeyNotFound(id))?;

    debug!(
        table = "api_keys",
        id,
        daily_usage = update.daily_usage,
        active = update.active,
        "usage incremented"
    );
    Ok(update)
}

async fn delete_key(pool: &SqlitePool, id: KeyId) -> Result<bool, ForgeError> {
    let res = sqlx::query("DELETE FROM api_keys WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}

async fn create_blog_post(pool: &SqlitePool, post: NewBlogPost) -> Result<BlogPost, ForgeError> {
    let slug = free_slug(pool, &post.slug).await?;
    let sql = format!(
        r"
        INSERT INTO blog_posts (slug, title, excerpt, content, topic, cover_url, cover_credit, degraded, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {POST_COLUMNS}
        "
    );
    let row = sqlx::query_as::<_, BlogPost>(&sql)
        .bind(slug)
        .bind(post.title)
        .bind(post.excerpt)
        .bind(post.content)
        .bind(post.topic)
        .bind(post.cover_url)
        .bind(post.cover_credit)
        .bind(post.degraded)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;
    Ok(row)
}

/// First of `base`, `base-2`, `base-3`, ... not yet taken.
async fn free_slug(pool: &SqlitePool, base: &str) -> Result<String, ForgeError> {
    let mut candidate = base.to_string();
    let mut suffix = 1u32;
    loop {
        let taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blog_posts WHERE slug = ?")
            .bind(&candidate)
            .fetch_one(pool)
            .await?;
        if taken == 0 {
            return Ok(candidate);
        }
        suffix += 1;
        candidate = format!("{base}-{suffix}");
    }
}

async fn list_blog_posts(pool: &SqlitePool, limit: u32) -> Result<Vec<BlogPost>, ForgeError> {
    let sql =
        format!("SELECT {POST_COLUMNS} FROM blog_posts ORDER BY created_at DESC, id DESC LIMIT ?");
    let rows = sqlx::query_as::<_, BlogPost>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Spawn the database actor and return a cloneable handle.
///
/// The actor is unnamed so several stores can live in one process.
pub async fn spawn(database_url: &str) -> Result<DbActorHandle, ForgeError> {
    let (actor, _jh) = ractor::Actor::spawn(None, DbActor, database_url.to_string())
        .await
        .map_err(|e| ForgeError::RactorError(format!("failed to spawn DbActor: {e}")))?;

    Ok(DbActorHandle { actor })
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), ForgeError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
