//! CertCheck Server - stateless X.509 trust chain verification API
//!
//! A single POST endpoint accepts a subject certificate, a PEM trust bundle
//! and an optional reference time, rebuilds the issuer chain through AIA
//! `caIssuers` pointers and answers 204 when the chain is trusted.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use server::CertCheckServer;

use axum::{extract::DefaultBodyLimit, middleware::from_fn, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the main application router with all routes and middleware
pub fn create_app(server: CertCheckServer) -> Router {
    let body_limit = server.config.max_body_bytes;

    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(middleware::request_timing_middleware))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(server)
}
