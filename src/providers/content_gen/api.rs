use ideaforge_schema::{GeminiErrorBody, GeminiGenerateContentRequest, GeminiResponseBody};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ContentGenResolvedConfig;
use crate::error::ForgeError;
use crate::providers::policy::{
    UpstreamErrorBody, classify_transport_error, classify_upstream_error,
};
use crate::providers::upstream_retry::send_with_retry;
use crate::providers::ProviderKind;
use crate::rotation::CallError;
use crate::utils::logging::{body_preview, with_pretty_json_debug};

const API_KEY_HEADER: &str = "x-goog-api-key";

impl UpstreamErrorBody for GeminiErrorBody {
    fn signals_quota(&self) -> bool {
        matches!(self.status(), Some("RESOURCE_EXHAUSTED" | "UNAVAILABLE"))
    }

    fn message(&self) -> String {
        GeminiErrorBody::message(self).to_string()
    }
}

/// Thin client for Gemini `models/{model}:generateContent`.
#[derive(Clone)]
pub struct GeminiApi {
    client: reqwest::Client,
    endpoint: Url,
    network_retry_times: usize,
}

impl GeminiApi {
    pub fn new(
        client: reqwest::Client,
        cfg: &ContentGenResolvedConfig,
    ) -> Result<Self, ForgeError> {
        let endpoint = generate_content_url(&cfg.api_url, &cfg.model)?;
        Ok(Self {
            client,
            endpoint,
            network_retry_times: cfg.network_retry_times,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Generate and return the first candidate's text.
    pub async fn generate_text(
        &self,
        secret: &str,
        body: &GeminiGenerateContentRequest,
    ) -> Result<String, CallError> {
        let resp = send_with_retry(ProviderKind::ContentGen, self.network_retry_times, || {
            self.client
                .post(self.endpoint.clone())
                .header(API_KEY_HEADER, secret)
                .json(body)
        })
        .await
        .map_err(|e| classify_transport_error(&e))?;

        if !resp.status().is_success() {
            return Err(classify_upstream_error::<GeminiErrorBody>(resp).await);
        }

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| CallError::Transient(format!("reading upstream body failed: {e}")))?;
        let parsed: GeminiResponseBody = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::debug!(
                %status,
                body = %body_preview(&bytes),
                "Gemini success body did not parse"
            );
            CallError::Validation {
                status: Some(status.as_u16()),
                message: format!("unparseable generateContent body: {e}"),
            }
        })?;

        with_pretty_json_debug(&parsed, |pretty| {
            tracing::debug!(body = %pretty, "Gemini generateContent response");
        });

        parsed.first_text().ok_or_else(|| CallError::Validation {
            status: Some(status.as_u16()),
            message: "model returned no text".to_string(),
        })
    }

    /// Generate and decode the text as a JSON document of type `T`.
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        secret: &str,
        body: &GeminiGenerateContentRequest,
    ) -> Result<T, CallError> {
        let text = self.generate_text(secret, body).await?;
        serde_json::from_str(strip_json_fence(&text)).map_err(|e| {
            CallError::validation(format!("model output is not the expected JSON: {e}"))
        })
    }
}

fn generate_content_url(base: &Url, model: &str) -> Result<Url, ForgeError> {
    let model = model.trim().trim_start_matches("models/");
    if model.is_empty() {
        return Err(ForgeError::UnexpectedError(
            "providers.content_gen.model must not be empty".to_string(),
        ));
    }
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(&format!("models/{model}:generateContent"))
        .map_err(|e| ForgeError::UnexpectedError(format!("invalid generateContent url: {e}")))
}

/// Models sometimes wrap JSON in a markdown fence even in JSON mode.
fn strip_json_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_model_path() {
        let base = Url::parse("https://generativelanguage.googleapis.com/v1beta").unwrap();
        let url = generate_content_url(&base, "models/gemini-2.0-flash").unwrap();
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn empty_model_is_a_config_error() {
        let base = Url::parse("https://example.com/v1beta/").unwrap();
        assert!(generate_content_url(&base, "  ").is_err());
    }

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_json_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_json_fence("```\n[]\n```"), "[]");
        assert_eq!(strip_json_fence("  {\"b\":2} "), "{\"b\":2}");
    }

    #[test]
    fn quota_statuses_in_payload_are_recognized() {
        let exhausted: GeminiErrorBody = serde_json::from_value(serde_json::json!({
            "error": {"code": 429, "message": "quota", "status": "RESOURCE_EXHAUSTED"}
        }))
        .unwrap();
        assert!(exhausted.signals_quota());

        let invalid: GeminiErrorBody = serde_json::from_value(serde_json::json!({
            "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
        }))
        .unwrap();
        assert!(!invalid.signals_quota());
        assert_eq!(UpstreamErrorBody::message(&invalid), "API key not valid");
    }
}
