// HTTP handlers for health, metrics and status

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use tracing::error;

use crate::web::{ApiResponse, AppState, MonitorStatus};

/// Registry health check: 200 only while connected and synced
pub async fn get_synced(State(state): State<AppState>) -> impl IntoResponse {
    if state.health.is_synced() {
        (StatusCode::OK, "true")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "false")
    }
}

/// Prometheus text exposition of every gauge
pub async fn get_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        ),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                e.to_string(),
            )
        }
    }
}

pub async fn get_status(State(state): State<AppState>) -> Json<ApiResponse<MonitorStatus>> {
    Json(ApiResponse::success(MonitorStatus {
        node_name: state.config.node_name.clone(),
        connected: state.health.is_connected(),
        synced: state.health.is_synced(),
    }))
}
