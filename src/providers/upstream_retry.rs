use backon::{ExponentialBuilder, Retryable};
use std::time::Duration;

use crate::providers::ProviderKind;

fn network_retry_policy(max_times: usize) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(100))
        .with_max_delay(Duration::from_millis(300))
        .with_max_times(max_times)
        .with_jitter()
}

/// Send a request, retrying only connect/timeout failures.
///
/// Any HTTP response (including 4xx/5xx) is returned as-is for classification; a status
/// error is never retried here because a quota response must reach the rotation loop.
pub(crate) async fn send_with_retry<F>(
    provider: ProviderKind,
    max_times: usize,
    build: F,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    (|| async { build().send().await })
        .retry(network_retry_policy(max_times))
        .when(|e: &reqwest::Error| e.is_connect() || e.is_timeout())
        .notify(|e: &reqwest::Error, dur: Duration| {
            tracing::debug!(
                provider = %provider,
                error = %e,
                retry_in_ms = dur.as_millis() as u64,
                "[{provider}] Upstream transport error (will retry)"
            );
        })
        .await
}
