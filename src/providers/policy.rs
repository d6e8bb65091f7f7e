use crate::rotation::CallError;
use crate::utils::logging::{body_preview, with_pretty_json_debug};
use reqwest::StatusCode;
use serde::{Serialize, de::DeserializeOwned};

/// Provider-specific structured error payload.
pub trait UpstreamErrorBody: std::fmt::Debug + DeserializeOwned + Serialize {
    /// The payload itself says the key or the service is out of capacity.
    fn signals_quota(&self) -> bool;

    fn message(&self) -> String;
}

/// Map a non-success upstream status onto the closed error set.
///
/// 429 and 503 are quota/overload, as is anything the payload flags as such.
/// Other 4xx are validation errors and everything else is transient.
pub fn classify_status(status: StatusCode, quota_signal: bool, message: String) -> CallError {
    let code = Some(status.as_u16());
    if quota_signal
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::SERVICE_UNAVAILABLE
    {
        return CallError::Quota {
            status: code,
            message,
        };
    }
    if status.is_client_error() {
        return CallError::Validation {
            status: code,
            message,
        };
    }
    CallError::Transient(format!("upstream status {status}: {message}"))
}

/// Read a failed response and classify it, preferring the structured payload.
pub(crate) async fn classify_upstream_error<E>(resp: reqwest::Response) -> CallError
where
    E: UpstreamErrorBody,
{
    let status = resp.status();
    let bytes = resp.bytes().await.unwrap_or_default();

    if let Ok(error) = serde_json::from_slice::<E>(&bytes) {
        let quota_signal = error.signals_quota();
        with_pretty_json_debug(&error, |pretty_error| {
            tracing::debug!(
                %status,
                quota_signal,
                body = %pretty_error,
                "Upstream structured error"
            );
        });
        return classify_status(status, quota_signal, error.message());
    }

    let preview = body_preview(&bytes);
    tracing::debug!(%status, body = %preview, "Upstream unstructured error");

    classify_status(status, false, preview)
}

/// Transport-level failure that survived the network retry.
pub(crate) fn classify_transport_error(err: &reqwest::Error) -> CallError {
    if err.is_builder() {
        return CallError::validation(format!("invalid upstream request: {err}"));
    }
    CallError::Transient(err.to_string())
}
