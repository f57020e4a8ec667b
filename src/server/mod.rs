//! HTTP API.
//!
//! Provides two endpoints:
//! - `POST /api/analysis/analyze` - analyze one target and return its report
//! - `GET /health` - liveness and GeoIP availability

mod handlers;
mod types;

use axum::routing::{get, post};
use axum::Router;

use handlers::{analyze_handler, health_handler};
pub use types::{AppState, HealthResponse};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/analysis/analyze", post(analyze_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Binds `bind_address` and serves until Ctrl-C.
///
/// On shutdown the state's token is cancelled so in-flight analyses stop
/// waiting on retries and finish with whatever they have.
pub async fn serve(bind_address: &str, state: AppState) -> Result<(), anyhow::Error> {
    let shutdown = state.shutdown.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind analysis server to {}: {}", bind_address, e))?;

    log::info!("Analysis server listening on http://{}/", bind_address);
    log::info!("  - Analyze: POST http://{}/api/analysis/analyze", bind_address);
    log::info!("  - Health: GET http://{}/health", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Could not listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            log::info!("Shutting down; cancelling in-flight analyses");
            shutdown.cancel();
        })
        .await
        .map_err(|e| anyhow::anyhow!("Analysis server error: {}", e))?;

    Ok(())
}
