//! LedgerSync - ledger sync-and-report service
//!
//! Main entry point: loads configuration, wires the application context,
//! starts the sync trigger and serves the HTTP API until Ctrl-C.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use ledgersync_infra::config;
use ledgersync_lib::utils::logging::{init_tracing, LogFormat};
use ledgersync_lib::{create_router, AppContext};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads the environment
    let dotenv = dotenvy::dotenv();

    init_tracing(LogFormat::from_env());
    tracing::info!("LedgerSync v{}", env!("CARGO_PKG_VERSION"));

    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded .env"),
        Err(err) => tracing::debug!(error = %err, "No .env file loaded"),
    }

    let config = config::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    let context = Arc::new(
        AppContext::new_with_config(config)
            .await
            .context("failed to initialise application context")?,
    );
    context.start_sync().await.context("failed to start sync")?;

    let server = &context.config.server;
    let addr: SocketAddr = format!("{}:{}", server.bind_address, server.port)
        .parse()
        .context("invalid bind address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    tracing::info!(%addr, "Listening");

    let served = axum::serve(listener, create_router(context.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    context.shutdown().await;
    tracing::info!("LedgerSync stopped");

    served.context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
