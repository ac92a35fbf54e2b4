use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use navigator_core::{load_config, validate_config, HttpTransport, Selector, DEFAULT_USER_AGENT};
use navigator_server::api::create_router;
use navigator_server::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How often expired selections are swept from the cache.
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var("NAVIGATOR_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;
    info!(version = VERSION, "Configuration loaded successfully");

    let transport =
        Arc::new(HttpTransport::new(DEFAULT_USER_AGENT).context("Failed to create HTTP client")?);
    let selector = Selector::from_config(&config, transport);
    info!(providers = ?selector.provider_names(), "Providers registered");

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, selector));

    let purge_handle = tokio::spawn(purge_expired(Arc::clone(&state)));

    let app = create_router(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    purge_handle.abort();
    info!("Server shut down");

    Ok(())
}

async fn purge_expired(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(PURGE_INTERVAL);
    interval.tick().await;
    loop {
        interval.tick().await;
        let removed = state.selector().cache().purge_expired().await;
        if removed > 0 {
            debug!(removed, "Purged expired selections");
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
