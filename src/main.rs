use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vams::config::Config;
use vams::ords::OrdsClient;
use vams::storage::ObjectStorage;
use vams::AppState;

#[derive(Parser, Debug)]
#[command(name = "vams")]
#[command(author, version, about = "Visual asset management server", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "vams.toml")]
    config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting VAMS v{}", env!("CARGO_PKG_VERSION"));

    // Backend (ORDS) client
    let ords = OrdsClient::from_config(&config.backend)?;
    if ords.is_none() {
        tracing::warn!("backend.base_url is not configured; proxied endpoints will answer 500");
    }

    // Object storage for photo uploads
    let storage = ObjectStorage::from_config(&config.storage).await;
    if storage.is_none() {
        tracing::warn!("storage.bucket is not configured; upload endpoints will answer 500");
    }

    let state = Arc::new(AppState::new(config.clone(), ords, storage));
    let app = vams::api::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
