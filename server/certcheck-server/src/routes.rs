use crate::handlers::{certificate_check, health};
use crate::server::CertCheckServer;
use axum::{
    routing::{get, post},
    Router,
};

/// Route path constants
pub mod paths {
    pub const ROOT: &str = "/";
    pub const HEALTH: &str = "/health";
    pub const API_V1: &str = "/api/v1";
    pub const CERTIFICATE_CHECK: &str = "/certificates/check";
}

/// Create health check routes
pub fn health_routes() -> Router<CertCheckServer> {
    Router::new().route(paths::HEALTH, get(health::health_check))
}

/// Create versioned API routes
pub fn api_v1_routes() -> Router<CertCheckServer> {
    Router::new().route(
        paths::CERTIFICATE_CHECK,
        post(certificate_check::check_certificate),
    )
}

/// Create all application routes
pub fn create_routes() -> Router<CertCheckServer> {
    Router::new()
        .route(paths::ROOT, post(certificate_check::check_certificate))
        .merge(health_routes())
        .nest(paths::API_V1, api_v1_routes())
}
