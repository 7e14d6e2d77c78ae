mod actor_framework;
mod app_system;
mod clients;
mod config;
mod db;
mod domain;
mod error;
mod http;
mod notify;
mod order_actor;
mod product_actor;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
mod mock_framework;

use std::sync::Arc;

use anyhow::Context;
use tokio::{net::TcpListener, signal};
use tracing::info;

use crate::app_system::{setup_tracing, StoreSystem};
use crate::config::Config;
use crate::http::{build_router, AppState};
use crate::notify::LogNotifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();

    let config = Config::load()?;
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("creating upload folder {}", config.upload_dir.display()))?;

    let system = StoreSystem::start(&config.database, Arc::new(LogNotifier::new(&config.notify_recipient)))?;

    let address = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(system.product_client.clone(), system.order_client.clone(), config);
    let app = build_router(state);

    let listener = TcpListener::bind(&address).await.with_context(|| format!("binding {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    system.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
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
