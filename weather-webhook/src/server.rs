//! Server wiring: state construction, listener, graceful shutdown.

use std::sync::Arc;

use anyhow::Context;
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::info;
use weather_core::{Config, WeatherService, provider_from_config};

use crate::{routes, state::AppState};

/// Build the service from config. Fails when no API key is configured.
pub fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let provider = provider_from_config(config)?;
    let service = WeatherService::new(Arc::new(provider), config.forecast.clone());
    Ok(AppState::new(service))
}

/// Serve until Ctrl+C or SIGTERM.
pub async fn run(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    let app = routes::create_router(state).layer(TraceLayer::new_for_http());

    let addr = listener.local_addr().context("Listener has no local address")?;
    info!("Webhook listening on http://{}/webhook", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
