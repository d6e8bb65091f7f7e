use ideaforge_schema::{UnsplashErrorBody, UnsplashSearchResponse};
use url::Url;

use crate::config::ImageSearchResolvedConfig;
use crate::error::ForgeError;
use crate::providers::ProviderKind;
use crate::providers::policy::{
    UpstreamErrorBody, classify_transport_error, classify_upstream_error,
};
use crate::providers::upstream_retry::send_with_retry;
use crate::rotation::CallError;

impl UpstreamErrorBody for UnsplashErrorBody {
    /// Unsplash answers an exhausted hourly limit with `403 Rate Limit Exceeded`.
    fn signals_quota(&self) -> bool {
        self.mentions_rate_limit()
    }

    fn message(&self) -> String {
        self.joined()
    }
}

/// Thin client for Unsplash `GET /search/photos`.
#[derive(Clone)]
pub struct UnsplashApi {
    client: reqwest::Client,
    search_url: Url,
    network_retry_times: usize,
}

impl UnsplashApi {
    pub fn new(
        client: reqwest::Client,
        cfg: &ImageSearchResolvedConfig,
    ) -> Result<Self, ForgeError> {
        let search_url = cfg
            .api_url
            .join("search/photos")
            .map_err(|e| ForgeError::UnexpectedError(format!("invalid image search url: {e}")))?;
        Ok(Self {
            client,
            search_url,
            network_retry_times: cfg.network_retry_times,
        })
    }

    pub async fn search(
        &self,
        secret: &str,
        query: &str,
    ) -> Result<UnsplashSearchResponse, CallError> {
        let auth = format!("Client-ID {secret}");
        let resp = send_with_retry(ProviderKind::ImageSearch, self.network_retry_times, || {
            self.client
                .get(self.search_url.clone())
                .header(reqwest::header::AUTHORIZATION, auth.as_str())
                .header("Accept-Version", "v1")
                .query(&[
                    ("query", query),
                    ("per_page", "1"),
                    ("orientation", "landscape"),
                ])
        })
        .await
        .map_err(|e| classify_transport_error(&e))?;

        if !resp.status().is_success() {
            return Err(classify_upstream_error::<UnsplashErrorBody>(resp).await);
        }

        let status = resp.status();
        resp.json::<UnsplashSearchResponse>()
            .await
            .map_err(|e| CallError::Validation {
                status: Some(status.as_u16()),
                message: format!("unparseable search body: {e}"),
            })
    }
}
