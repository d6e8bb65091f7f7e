use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Gemini API error response structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiErrorBody {
    #[serde(rename = "error")]
    pub inner: GeminiErrorObject,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiErrorObject {
    /// Numeric error code, usually equal to the HTTP status (`429`, `400`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Google-style canonical status name.
    ///
    /// - `"RESOURCE_EXHAUSTED"` (rate limit / quota)
    /// - `"UNAVAILABLE"` (model overloaded)
    /// - `"INVALID_ARGUMENT"` (bad request, also returned for an invalid API key)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<Value>>,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl GeminiErrorBody {
    pub fn status(&self) -> Option<&str> {
        self.inner.status.as_deref()
    }

    pub fn message(&self) -> &str {
        self.inner
            .message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or("upstream error")
    }
}
