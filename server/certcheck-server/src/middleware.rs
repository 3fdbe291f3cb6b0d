use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Header carrying the per-request identifier
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(1);

/// Request timing middleware
///
/// Logs the duration of every request and tags the response with a request id.
pub async fn request_timing_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let start = Instant::now();
    let mut response = next.run(request).await;
    let duration = start.elapsed();

    if duration > SLOW_REQUEST_THRESHOLD {
        tracing::warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %response.status().as_u16(),
            duration_ms = duration.as_millis(),
            "Slow request detected"
        );
    } else {
        tracing::info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %response.status().as_u16(),
            duration_ms = duration.as_millis(),
            "Request finished"
        );
    }

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }

    response
}
