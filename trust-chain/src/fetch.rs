//! Retrieval of issuer certificates from the URIs a certificate advertises
//!
//! The builder only sees the [`IssuerFetcher`] trait, so the network client
//! can be swapped for a deterministic source in tests.

use crate::error::FetchError;
use async_trait::async_trait;
use std::time::Duration;

/// Default per-request timeout for issuer retrieval
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest issuer certificate body accepted
pub const DEFAULT_MAX_CERTIFICATE_BYTES: usize = 64 * 1024;

/// Source of raw issuer certificate bytes
#[async_trait]
pub trait IssuerFetcher: Send + Sync {
    /// Fetch the raw body published at `url`
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Unauthenticated HTTP GET retrieval with a network-level timeout
#[derive(Clone)]
pub struct HttpIssuerFetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpIssuerFetcher {
    /// Create a fetcher whose requests are bounded by `timeout`
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!("trust-chain/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            client,
            max_body_bytes: DEFAULT_MAX_CERTIFICATE_BYTES,
        }
    }

    /// Override the accepted body size
    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

impl Default for HttpIssuerFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT)
    }
}

#[async_trait]
impl IssuerFetcher for HttpIssuerFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let mut response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if response
            .content_length()
            .is_some_and(|len| len > self.max_body_bytes as u64)
        {
            return Err(FetchError::BodyTooLarge {
                url: url.to_string(),
                limit: self.max_body_bytes,
            });
        }

        // Chunked responses carry no length up front; enforce the cap while reading
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })? {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(FetchError::BodyTooLarge {
                    url: url.to_string(),
                    limit: self.max_body_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        if body.is_empty() {
            return Err(FetchError::EmptyBody { url: url.to_string() });
        }

        Ok(body)
    }
}
