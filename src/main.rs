use mimalloc::MiMalloc;
use paste_vercel::config::Config;
use paste_vercel::server::{PasteState, paste_router};
use paste_vercel::service::{PasteStorage, janitor};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        listen_addr = %cfg.basic.listen_addr,
        backend = ?cfg.storage.resolved_backend(),
        loglevel = %cfg.basic.loglevel,
        max_body_bytes = cfg.limits.max_body_bytes,
    );
    if cfg.basic.admin_pin == paste_vercel::config::DEFAULT_ADMIN_PIN {
        warn!("ADMIN_PIN not set; using the default PIN");
    }

    let storage = PasteStorage::connect(&cfg.storage).await?;
    let _purge = janitor::spawn_purge_task(storage.clone(), cfg.storage.purge_interval());

    let state = PasteState::new(storage, &cfg)?;
    let app = paste_router(state);

    let listener = TcpListener::bind(cfg.basic.listen_addr.as_str()).await?;
    info!("HTTP server listening on {}", cfg.basic.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}
