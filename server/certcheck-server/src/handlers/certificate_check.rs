//! Certificate check endpoint
//!
//! The body is decoded by hand rather than through the `Json` extractor so
//! that empty and malformed bodies produce the plain-text 400 messages
//! clients rely on, independent of the `Content-Type` header.

use crate::error::{ApiError, ApiResult};
use crate::server::CertCheckServer;
use axum::{body::Bytes, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

/// Message returned when the request carries no body
pub const EMPTY_BODY_MESSAGE: &str = "invalid body provided";

/// Certificate check request
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CertificateCheckRequest {
    /// PEM encoded certificate to validate
    #[serde(rename = "SubjectCertificate", alias = "subjectCertificate", alias = "subject_certificate")]
    pub subject_certificate: String,
    /// Concatenated PEM root certificates
    #[serde(rename = "Truststore", alias = "truststore", alias = "trust_store")]
    pub truststore: String,
    /// Instant at which validity is evaluated; now when absent
    #[serde(rename = "ReferenceTime", alias = "referenceTime", alias = "reference_time")]
    pub reference_time: Option<DateTime<Utc>>,
}

impl CertificateCheckRequest {
    /// Decode a request body
    pub fn from_body(body: &[u8]) -> ApiResult<Self> {
        if body.is_empty() {
            return Err(ApiError::bad_request(EMPTY_BODY_MESSAGE));
        }
        Ok(serde_json::from_slice(body)?)
    }
}

/// Validate a subject certificate against a caller-supplied trust bundle
///
/// Answers 204 when the chain is trusted at the reference time, otherwise
/// 400 with the reason as a plain-text body.
pub async fn check_certificate(
    State(server): State<CertCheckServer>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let request = CertificateCheckRequest::from_body(&body)?;
    let reference_time = request.reference_time.unwrap_or_else(Utc::now);
    debug!(reference_time = %reference_time, "Checking certificate");

    let result = server
        .checker
        .check(&request.subject_certificate, &request.truststore, reference_time)
        .await?;

    if result.ok {
        info!(reference_time = %reference_time, "Certificate chain trusted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::rejected(result.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case_fields() {
        let request = CertificateCheckRequest::from_body(
            br#"{"SubjectCertificate":"leaf","Truststore":"roots","ReferenceTime":"2024-03-01T00:00:00Z"}"#,
        )
        .expect("decode");

        assert_eq!(request.subject_certificate, "leaf");
        assert_eq!(request.truststore, "roots");
        assert_eq!(
            request.reference_time.map(|t| t.timestamp()),
            Some(1_709_251_200)
        );
    }

    #[test]
    fn test_aliases_and_missing_fields() {
        let request =
            CertificateCheckRequest::from_body(br#"{"subjectCertificate":"leaf"}"#).expect("decode");

        assert_eq!(request.subject_certificate, "leaf");
        assert!(request.truststore.is_empty());
        assert!(request.reference_time.is_none());
    }

    #[test]
    fn test_empty_body_rejected() {
        let err = CertificateCheckRequest::from_body(b"").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { ref message } if message == EMPTY_BODY_MESSAGE));
    }

    #[test]
    fn test_whitespace_body_goes_to_json_decoding() {
        let err = CertificateCheckRequest::from_body(b"  \n").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { ref message } if message.starts_with("JSON format error:")));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = CertificateCheckRequest::from_body(b"{not json").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { ref message } if message.starts_with("JSON format error:")));
    }
}
