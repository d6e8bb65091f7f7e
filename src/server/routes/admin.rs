use crate::db::{ApiKey, BlogPost, KeyId, KeyPatch, NewApiKey};
use crate::error::ForgeError;
use crate::providers::ProviderKind;
use crate::server::router::ForgeState;
use crate::utils::secret::mask_secret;
use axum::extract::rejection::JsonRejection;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key as shown to admins; the secret is always masked.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyView {
    pub id: KeyId,
    pub provider: String,
    pub secret: String,
    pub active: bool,
    pub daily_usage: u32,
    pub last_reset: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ApiKey> for KeyView {
    fn from(key: ApiKey) -> Self {
        Self {
            id: key.id,
            provider: key.provider,
            secret: mask_secret(&key.secret),
            active: key.active,
            daily_usage: key.daily_usage,
            last_reset: key.last_reset,
            created_at: key.created_at,
            updated_at: key.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct KeysQuery {
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateKeyBody {
    pub provider: String,
    pub secret: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateKeyBody {
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct TopicsBody {
    pub topics: Vec<String>,
}

pub fn router() -> Router<ForgeState> {
    Router::new()
        .route("/admin/keys", get(list_keys).post(create_key))
        .route("/admin/keys/reset", post(reset_keys))
        .route("/admin/keys/{id}", patch(update_key).delete(delete_key))
        .route("/admin/blog/topics", post(enqueue_topics))
        .route("/admin/blog/run", post(run_blog_once))
}

fn parse_provider(raw: &str) -> Result<ProviderKind, ForgeError> {
    raw.parse().map_err(ForgeError::RequestRejected)
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ForgeError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ForgeError::RequestRejected(e.body_text()))
}

/// GET /admin/keys?provider=
pub async fn list_keys(
    State(state): State<ForgeState>,
    Query(params): Query<KeysQuery>,
) -> Result<Json<Vec<KeyView>>, ForgeError> {
    let provider = params
        .provider
        .as_deref()
        .map(parse_provider)
        .transpose()?;
    let keys = state
        .store
        .list_keys(provider.map(ProviderKind::as_str))
        .await?;
    Ok(Json(keys.into_iter().map(KeyView::from).collect()))
}

/// POST /admin/keys
///
/// 201 for a new key, 200 with the stored key when the secret already exists.
pub async fn create_key(
    State(state): State<ForgeState>,
    payload: Result<Json<CreateKeyBody>, JsonRejection>,
) -> Result<Response, ForgeError> {
    let body = json_body(payload)?;
    let provider = parse_provider(&body.provider)?;
    let secret = body.secret.trim();
    if secret.is_empty() {
        return Err(ForgeError::RequestRejected(
            "secret must not be empty".to_string(),
        ));
    }

    if let Some(existing) = state.store.get_key_by_secret(secret).await? {
        return Ok((StatusCode::OK, Json(KeyView::from(existing))).into_response());
    }

    let key = state
        .store
        .create_key(NewApiKey {
            provider: provider.as_str().to_string(),
            secret: secret.to_string(),
        })
        .await?;
    tracing::info!(key.id = key.id, provider = %provider, "key added by admin");
    Ok((StatusCode::CREATED, Json(KeyView::from(key))).into_response())
}

/// PATCH /admin/keys/{id}
pub async fn update_key(
    State(state): State<ForgeState>,
    Path(id): Path<KeyId>,
    payload: Result<Json<UpdateKeyBody>, JsonRejection>,
) -> Result<Json<KeyView>, ForgeError> {
    let body = json_body(payload)?;
    let patch = KeyPatch {
        active: body.active,
        ..Default::default()
    };
    if patch.is_empty() {
        return Err(ForgeError::RequestRejected("nothing to update".to_string()));
    }

    state.store.update_key(id, patch).await?;
    let key = state.store.get_key(id).await?;
    tracing::info!(key.id = id, active = key.active, "key updated by admin");
    Ok(Json(KeyView::from(key)))
}

/// DELETE /admin/keys/{id}
pub async fn delete_key(
    State(state): State<ForgeState>,
    Path(id): Path<KeyId>,
) -> Result<StatusCode, ForgeError> {
    if !state.store.delete_key(id).await? {
        return Err(ForgeError::KeyNotFound(id));
    }
    tracing::info!(key.id = id, "key deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub reset: usize,
}

/// POST /admin/keys/reset
pub async fn reset_keys(
    State(state): State<ForgeState>,
) -> Result<Json<ResetResponse>, ForgeError> {
    let reset = state.providers.accountant.reset_stale(Utc::now()).await?;
    Ok(Json(ResetResponse { reset }))
}

#[derive(Debug, Serialize)]
pub struct TopicsResponse {
    pub added: usize,
    pub queued: Vec<String>,
}

/// POST /admin/blog/topics
pub async fn enqueue_topics(
    State(state): State<ForgeState>,
    payload: Result<Json<TopicsBody>, JsonRejection>,
) -> Result<Json<TopicsResponse>, ForgeError> {
    let body = json_body(payload)?;
    let added = state.blog.enqueue(body.topics).await?;
    let queued = state.blog.queued().await?;
    Ok(Json(TopicsResponse { added, queued }))
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub post: Option<BlogPost>,
}

/// POST /admin/blog/run
pub async fn run_blog_once(
    State(state): State<ForgeState>,
) -> Result<Json<RunResponse>, ForgeError> {
    let post = state.blog.run_once().await?;
    Ok(Json(RunResponse { post }))
}
