pub mod handlers;
pub mod server;

pub use server::{create_router, start_web_server};

use serde::Serialize;
use std::sync::Arc;

use crate::config::Config;
use crate::metrics::PrometheusSink;
use crate::monitor::HealthFlags;

// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub health: Arc<HealthFlags>,
    pub metrics: Arc<PrometheusSink>,
}

impl AppState {
    pub fn new(config: Arc<Config>, health: Arc<HealthFlags>, metrics: Arc<PrometheusSink>) -> Self {
        Self {
            config,
            health,
            metrics,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonitorStatus {
    pub node_name: String,
    pub connected: bool,
    pub synced: bool,
}
