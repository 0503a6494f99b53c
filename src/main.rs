use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{info, warn};

use api_sut::api::create_router_from_config;
use api_sut::app::{AppConfig, AppState};
use api_sut::infra::{InMemoryItemRepository, init_metrics_handle, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = AppConfig::from_env().context("invalid configuration")?;
    init_tracing(config.log_format);

    let repository = Arc::new(
        InMemoryItemRepository::with_defaults().context("seed data failed validation")?,
    );

    let mut state = AppState::new(repository);
    match init_metrics_handle() {
        Some(handle) => state = state.with_metrics(handle),
        None => warn!("Prometheus recorder could not be installed; /metrics is disabled"),
    }

    let router = create_router_from_config(Arc::new(state), &config);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        %addr,
        rate_limited = config.rate_limit.is_some(),
        "API-SUT listening"
    );

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
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
                warn!(error = %e, "Failed to listen for SIGTERM");
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

    info!("Shutdown signal received");
}
