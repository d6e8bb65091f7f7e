use ideaforge::blog::{self, BlogPipeline};
use ideaforge::config::Config;
use ideaforge::db;
use ideaforge::keys::{KeyStore, spawn_reset_job};
use ideaforge::providers::Providers;
use ideaforge::server::{ForgeState, forge_router};
use mimalloc::MiMalloc;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::from_toml();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.basic.database_url,
        loglevel = %cfg.basic.loglevel,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        daily_cap = cfg.usage.daily_cap,
        max_rotations = cfg.usage.max_rotations,
        blog_enabled = cfg.blog.enabled,
    );

    let db = db::spawn(&cfg.basic.database_url).await?;
    let store: Arc<dyn KeyStore> = Arc::new(db.clone());

    let providers = Providers::new(store, &cfg)?;
    match providers.seed_configured_keys().await {
        Ok(0) => {}
        Ok(added) => info!(added, "seeded provider keys from config"),
        Err(e) => warn!(error = %e, "failed to seed provider keys from config"),
    }

    let _reset_job = spawn_reset_job(providers.accountant.clone(), cfg.usage.poll_interval());

    let blog = blog::spawn(
        BlogPipeline::from_providers(&providers, db.clone()),
        cfg.blog.topics.clone(),
        cfg.blog.enabled.then(|| cfg.blog.interval()),
    )
    .await?;

    let state = ForgeState::new(providers, db, blog, Arc::from(cfg.basic.admin_key.as_str()));
    let app = forge_router(state, &cfg.basic.cors_origins);

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
