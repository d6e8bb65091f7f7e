use async_trait::async_trait;
use ideaforge_schema::ImageResult;
use moka::sync::Cache;
use std::time::Duration;

use super::api::UnsplashApi;
use super::fallback::placeholder_image;
use crate::providers::ProviderKind;
use crate::rotation::{CallError, Invocation, ProviderCall, RotatingClient};

const CACHE_CAPACITY: u64 = 1_024;

/// Query → first matching photo on the image-search provider.
///
/// `Ok(None)` means the provider answered but had nothing for the query.
pub struct ImageSearchCall {
    api: UnsplashApi,
}

impl ImageSearchCall {
    pub fn new(api: UnsplashApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ProviderCall for ImageSearchCall {
    type Request = String;
    type Output = Option<ImageResult>;

    fn provider(&self) -> ProviderKind {
        ProviderKind::ImageSearch
    }

    async fn call(&self, secret: &str, query: &String) -> Result<Option<ImageResult>, CallError> {
        let response = self.api.search(secret, query.trim()).await?;
        Ok(response.results.into_iter().next().map(|photo| ImageResult {
            alt: photo
                .alt_description
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| query.trim().to_string()),
            credit: photo
                .user
                .map_or_else(|| "Unsplash".to_string(), |u| format!("{} on Unsplash", u.name)),
            source_url: photo.links.and_then(|l| l.html),
            url: photo.urls.regular,
        }))
    }

    fn fallback(&self, query: &String) -> Option<ImageResult> {
        Some(placeholder_image(query))
    }
}

/// Cover image lookup with a per-query TTL cache of provider hits.
pub struct CoverImageFinder {
    client: RotatingClient<ImageSearchCall>,
    cache: Cache<String, ImageResult>,
}

impl CoverImageFinder {
    pub fn new(client: RotatingClient<ImageSearchCall>, cache_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(cache_ttl)
            .build();
        Self { client, cache }
    }

    /// Always yields an image; placeholders come back with `degraded = true`.
    pub async fn find(&self, query: &str) -> Result<Invocation<ImageResult>, CallError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CallError::validation("query must not be empty"));
        }

        let cache_key = query.to_lowercase();
        if let Some(hit) = self.cache.get(&cache_key) {
            tracing::debug!(query, "image cache hit");
            return Ok(Invocation {
                output: hit,
                degraded: false,
                key_id: None,
                attempts: Vec::new(),
            });
        }

        let invocation = self.client.invoke(&query.to_string()).await?;
        let degraded = invocation.degraded || invocation.output.is_none();
        let mut invocation =
            invocation.map(|found| found.unwrap_or_else(|| placeholder_image(query)));
        invocation.degraded = degraded;

        if !invocation.degraded {
            self.cache.insert(cache_key, invocation.output.clone());
        }
        Ok(invocation)
    }
}
