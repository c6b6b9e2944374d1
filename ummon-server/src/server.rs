use crate::handlers;
use axum::{Router, routing::get};
use std::sync::Arc;
use tracing::info;
use ummon_core::config::ServerConfig;
use ummon_translator::{SnapshotSource, Translator};

/// Shared state for the HTTP surface.
pub struct AppState {
    pub translator: Translator<Arc<dyn SnapshotSource>>,
    /// Upstream host, reported by the health endpoint.
    pub upstream: String,
    pub metrics_path: String,
}

/// Build the router: the metrics endpoint plus `/health`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(&state.metrics_path, get(handlers::metrics::metrics))
        .route("/health", get(handlers::health::health_check))
        .with_state(state)
}

/// Serve until Ctrl+C / SIGTERM.
pub async fn serve(config: &ServerConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.addr).await?;

    info!(addr = %config.addr, path = %config.metrics_path, "Serving metrics");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Exporter stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, stopping...");
}
