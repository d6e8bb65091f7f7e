use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error as ThisError;

use crate::rotation::CallError;

#[derive(Debug, ThisError)]
pub enum ForgeError {
    #[error("Request rejected: {0}")]
    RequestRejected(String),

    #[error("Key not found: {0}")]
    KeyNotFound(i64),

    #[error(transparent)]
    Call(#[from] CallError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl IntoResponse for ForgeError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            err @ (ForgeError::DatabaseError(_)
            | ForgeError::RactorError(_)
            | ForgeError::UnexpectedError(_)
            | ForgeError::JsonError(_)) => {
                tracing::error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorObject::new("INTERNAL_ERROR", "An internal server error occurred."),
                )
            }

            ForgeError::RequestRejected(message) => (
                StatusCode::BAD_REQUEST,
                ApiErrorObject::new("INVALID_REQUEST", message),
            ),

            ForgeError::KeyNotFound(id) => (
                StatusCode::NOT_FOUND,
                ApiErrorObject::new("NOT_FOUND", format!("API key {id} does not exist.")),
            ),

            ForgeError::Call(CallError::Validation { status, message }) => {
                tracing::warn!(upstream_status = ?status, %message, "upstream rejected request");
                (
                    StatusCode::BAD_REQUEST,
                    ApiErrorObject::new("UPSTREAM_REJECTED", "The provider rejected the request.")
                        .with_details(serde_json::json!({ "upstreamStatus": status })),
                )
            }

            ForgeError::Call(CallError::Transient(message)) => {
                tracing::warn!(%message, "upstream transient failure");
                (
                    StatusCode::BAD_GATEWAY,
                    ApiErrorObject::new("UPSTREAM_ERROR", "Upstream service error."),
                )
            }

            // Rotation absorbs quota errors; only reachable if a caller bypasses it.
            ForgeError::Call(CallError::Quota { .. }) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiErrorObject::new("RATE_LIMIT", "Upstream quota exhausted."),
            ),
        };
        (status, Json(ApiErrorBody { inner: error_body })).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Debug, Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiErrorObject {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}
