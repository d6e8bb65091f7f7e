use crate::error::ForgeError;
use crate::server::router::ForgeState;
use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use ideaforge_schema::ImageResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub image: ImageResult,
    pub degraded: bool,
}

pub fn router() -> Router<ForgeState> {
    Router::new().route("/api/images/search", get(search_image))
}

/// GET /api/images/search?query=
pub async fn search_image(
    State(state): State<ForgeState>,
    Query(params): Query<ImageQuery>,
) -> Result<Json<ImageResponse>, ForgeError> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ForgeError::RequestRejected("query must not be empty".to_string()))?;

    let invocation = state.providers.images.find(query).await?;
    Ok(Json(ImageResponse {
        image: invocation.output,
        degraded: invocation.degraded,
    }))
}
