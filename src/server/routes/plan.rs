use crate::error::ForgeError;
use crate::providers::content_gen::PlanRequest;
use crate::server::router::ForgeState;
use axum::extract::rejection::JsonRejection;
use axum::{Json, Router, extract::State, routing::post};
use ideaforge_schema::MvpPlan;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub plan: MvpPlan,
    /// The plan is the offline template, not a model answer.
    pub degraded: bool,
}

pub fn router() -> Router<ForgeState> {
    Router::new().route("/api/mvp-plan", post(create_plan))
}

/// POST /api/mvp-plan
pub async fn create_plan(
    State(state): State<ForgeState>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<PlanResponse>, ForgeError> {
    let Json(request) = payload.map_err(|e| ForgeError::RequestRejected(e.body_text()))?;
    if request.idea.trim().is_empty() {
        return Err(ForgeError::RequestRejected(
            "idea must not be empty".to_string(),
        ));
    }

    let invocation = state.providers.planner.invoke(&request).await?;
    Ok(Json(PlanResponse {
        plan: invocation.output,
        degraded: invocation.degraded,
    }))
}
