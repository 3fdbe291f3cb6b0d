use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};
use trust_chain::CheckError;
use uuid::Uuid;

/// Errors returned by API handlers
///
/// Bodies are plain text: the message alone, without the variant prefix, so
/// clients receive validator reasons unchanged.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Invalid certificate: {message}")]
    InvalidCertificate { message: String },

    #[error("Certificate rejected: {message}")]
    CertificateRejected { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a rejection carrying the verification failure reason
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::CertificateRejected {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. }
            | ApiError::InvalidCertificate { .. }
            | ApiError::CertificateRejected { .. } => StatusCode::BAD_REQUEST,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest { .. } => "bad_request",
            ApiError::InvalidCertificate { .. } => "invalid_certificate",
            ApiError::CertificateRejected { .. } => "certificate_rejected",
            ApiError::Internal { .. } => "internal_error",
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::BadRequest { message }
            | ApiError::InvalidCertificate { message }
            | ApiError::CertificateRejected { message }
            | ApiError::Internal { message } => message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        if status_code.is_server_error() {
            error!(
                error_id = %error_id,
                error_type = %self.error_type(),
                status_code = %status_code.as_u16(),
                error = %self,
                "API error occurred"
            );
        } else {
            warn!(
                error_id = %error_id,
                error_type = %self.error_type(),
                status_code = %status_code.as_u16(),
                error = %self,
                "Request rejected"
            );
        }

        let body = match &self {
            // Don't expose internal details
            ApiError::Internal { .. } => "internal server error".to_string(),
            _ => self.message().to_string(),
        };

        (
            status_code,
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                (header::HeaderName::from_static("x-error-id"), error_id),
            ],
            body,
        )
            .into_response()
    }
}

impl From<CheckError> for ApiError {
    fn from(error: CheckError) -> Self {
        match error {
            CheckError::InvalidSubject(e) => ApiError::InvalidCertificate {
                message: e.to_string(),
            },
            CheckError::Internal(message) => ApiError::Internal { message },
        }
    }
}

/// Convert serde JSON errors to API errors
impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::BadRequest {
            message: format!("JSON format error: {error}"),
        }
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
