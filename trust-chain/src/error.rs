use thiserror::Error;

/// Errors raised while decoding or parsing a certificate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CertificateError {
    #[error("Invalid block: {0}")]
    InvalidPem(String),

    #[error("Could not parse the certificate: {0}")]
    Parse(String),

    #[error("Could not parse the certificate: {0} trailing bytes after DER structure")]
    TrailingData(usize),

    #[error("Invalid validity timestamp in certificate")]
    InvalidValidity,
}

/// Errors raised while retrieving an issuer certificate
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid issuer URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Response from {url} has an empty body")]
    EmptyBody { url: String },

    #[error("Response from {url} exceeds {limit} bytes")]
    BodyTooLarge { url: String, limit: usize },
}

/// Errors surfaced by a certificate check before a verdict can be produced
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("{0}")]
    InvalidSubject(#[from] CertificateError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T, E = CertificateError> = std::result::Result<T, E>;
