use crate::web::{handlers, AppState};
use anyhow::Result;
use axum::{routing::get, Router};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// Serve the health and metrics endpoints until `cancel` fires
pub async fn start_web_server(state: AppState, cancel: CancellationToken) -> Result<()> {
    let addr = state.config.health_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Http api running on http://{}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;
    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/synced", get(handlers::get_synced))
        .route("/metrics", get(handlers::get_metrics))
        .route("/api/status", get(handlers::get_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
