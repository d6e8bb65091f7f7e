use crate::db::BlogPost;
use crate::error::ForgeError;
use crate::server::router::ForgeState;
use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PostsResponse {
    pub posts: Vec<BlogPost>,
}

pub fn router() -> Router<ForgeState> {
    Router::new().route("/api/blog/posts", get(list_posts))
}

/// GET /api/blog/posts?limit=
pub async fn list_posts(
    State(state): State<ForgeState>,
    Query(params): Query<PostsQuery>,
) -> Result<Json<PostsResponse>, ForgeError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let posts = state.db.list_blog_posts(limit).await?;
    Ok(Json(PostsResponse { posts }))
}
