use crate::config::{Config, ContentGenResolvedConfig, ImageSearchResolvedConfig};
use crate::error::ForgeError;
use crate::keys::{KeyStore, UsageAccountant, seed_keys};
use crate::providers::ProviderKind;
use crate::providers::content_gen::{BlogCall, BlogWriter, GeminiApi, MvpPlanner, PlanCall};
use crate::providers::image_search::{CoverImageFinder, ImageSearchCall, UnsplashApi};
use crate::rotation::RotatingClient;
use std::{sync::Arc, time::Duration};
use tracing::info;

const USER_AGENT: &str = concat!("ideaforge/", env!("CARGO_PKG_VERSION"));

/// Aggregates the rotating clients for all providers.
///
/// Keep this as a simple struct (vs. a dynamic registry); there are two providers and
/// three consumers.
#[derive(Clone)]
pub struct Providers {
    pub planner: Arc<MvpPlanner>,
    pub blog_writer: Arc<BlogWriter>,
    pub images: Arc<CoverImageFinder>,
    pub accountant: UsageAccountant,
    pub content_gen_cfg: Arc<ContentGenResolvedConfig>,
    pub image_search_cfg: Arc<ImageSearchResolvedConfig>,
}

impl Providers {
    pub fn new(store: Arc<dyn KeyStore>, cfg: &Config) -> Result<Self, ForgeError> {
        let content_gen_cfg = Arc::new(cfg.content_gen());
        let image_search_cfg = Arc::new(cfg.image_search());
        let usage = &cfg.usage;

        // Log resolved provider configs here so `main` stays wiring-only.
        info!(
            usage_daily_cap = usage.daily_cap,
            usage_max_rotations = usage.max_rotations,
            usage_reset_after_secs = usage.reset_after_secs,
            usage_poll_interval_secs = usage.poll_interval_secs,
            "Usage limits loaded"
        );
        info!(
            content_gen_api_url = %content_gen_cfg.api_url.as_str(),
            content_gen_model = %content_gen_cfg.model,
            content_gen_proxy = %content_gen_cfg.proxy.as_ref().map_or("<none>", |u| u.as_str()),
            content_gen_request_timeout_secs = content_gen_cfg.request_timeout_secs,
            content_gen_seeded_secrets = content_gen_cfg.secrets.len(),
            content_gen_default_secret = content_gen_cfg.default_secret.is_some(),
            "Content-gen config (effective)"
        );
        info!(
            image_search_api_url = %image_search_cfg.api_url.as_str(),
            image_search_proxy = %image_search_cfg.proxy.as_ref().map_or("<none>", |u| u.as_str()),
            image_search_request_timeout_secs = image_search_cfg.request_timeout_secs,
            image_search_cache_ttl_secs = image_search_cfg.cache_ttl_secs,
            image_search_seeded_secrets = image_search_cfg.secrets.len(),
            image_search_default_secret = image_search_cfg.default_secret.is_some(),
            "Image-search config (effective)"
        );

        let accountant = UsageAccountant::from_config(store, usage);

        let content_client = build_client(
            content_gen_cfg.proxy.as_ref(),
            content_gen_cfg.connect_timeout_secs,
            content_gen_cfg.request_timeout_secs,
        )?;
        let gemini = GeminiApi::new(content_client, &content_gen_cfg)?;

        let planner = RotatingClient::new(
            PlanCall::new(gemini.clone()),
            accountant.clone(),
            usage.max_rotations,
        )
        .with_default_secret(content_gen_cfg.default_secret.clone());
        let blog_writer = RotatingClient::new(
            BlogCall::new(gemini),
            accountant.clone(),
            usage.max_rotations,
        )
        .with_default_secret(content_gen_cfg.default_secret.clone());

        let image_client = build_client(
            image_search_cfg.proxy.as_ref(),
            image_search_cfg.connect_timeout_secs,
            image_search_cfg.request_timeout_secs,
        )?;
        let unsplash = UnsplashApi::new(image_client, &image_search_cfg)?;
        let images = CoverImageFinder::new(
            RotatingClient::new(
                ImageSearchCall::new(unsplash),
                accountant.clone(),
                usage.max_rotations,
            )
            .with_default_secret(image_search_cfg.default_secret.clone()),
            Duration::from_secs(image_search_cfg.cache_ttl_secs),
        );

        Ok(Self {
            planner: Arc::new(planner),
            blog_writer: Arc::new(blog_writer),
            images: Arc::new(images),
            accountant,
            content_gen_cfg,
            image_search_cfg,
        })
    }

    /// Insert the secrets listed in config. Returns how many keys were new.
    pub async fn seed_configured_keys(&self) -> Result<usize, ForgeError> {
        let store = self.accountant.store().as_ref();
        let content =
            seed_keys(store, ProviderKind::ContentGen, &self.content_gen_cfg.secrets).await?;
        let image =
            seed_keys(store, ProviderKind::ImageSearch, &self.image_search_cfg.secrets).await?;
        Ok(content + image)
    }
}

fn build_client(
    proxy: Option<&url::Url>,
    connect_timeout_secs: u64,
    request_timeout_secs: u64,
) -> Result<reqwest::Client, ForgeError> {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(request_timeout_secs));

    if let Some(proxy_url) = proxy {
        let proxy = reqwest::Proxy::all(proxy_url.as_str())
            .map_err(|e| ForgeError::UnexpectedError(format!("invalid proxy url: {e}")))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| ForgeError::UnexpectedError(format!("failed to build reqwest client: {e}")))
}
