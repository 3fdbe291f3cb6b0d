use crate::config::ServerConfig;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;
use trust_chain::{CertificateChecker, HttpIssuerFetcher, IssuerFetcher};

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct CertCheckServer {
    /// Server configuration
    pub config: ServerConfig,
    /// Chain discovery and verification pipeline
    pub checker: CertificateChecker,
    /// Process start time, reported by the health endpoint
    pub started_at: DateTime<Utc>,
}

impl CertCheckServer {
    /// Create a server that downloads issuer certificates over HTTP
    pub fn new(config: ServerConfig) -> Self {
        let fetcher = HttpIssuerFetcher::new(config.fetch_timeout());
        info!(
            fetch_timeout_secs = config.fetch_timeout_secs,
            "Issuer fetcher configured"
        );
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Create a server with a custom issuer fetcher
    pub fn with_fetcher(config: ServerConfig, fetcher: Arc<dyn IssuerFetcher>) -> Self {
        Self {
            config,
            checker: CertificateChecker::new(fetcher),
            started_at: Utc::now(),
        }
    }

    /// Seconds since the server state was created
    pub fn uptime_secs(&self) -> u64 {
        u64::try_from((Utc::now() - self.started_at).num_seconds()).unwrap_or(0)
    }
}
