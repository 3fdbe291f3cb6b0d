use crate::server::CertCheckServer;
use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Current timestamp in RFC3339 format
    pub timestamp: String,
    /// Uptime in seconds
    pub uptime: u64,
}

/// Liveness probe
pub async fn health_check(State(server): State<CertCheckServer>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
        uptime: server.uptime_secs(),
    })
}
