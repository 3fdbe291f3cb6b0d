//! Server configuration from command line flags and environment
//!
//! Every flag has an environment fallback so the server can be configured
//! entirely through a `.env` file or container environment.

use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// CertCheck HTTP Server
#[derive(Parser, Debug, Clone)]
#[command(name = "certcheck-server")]
#[command(about = "Stateless X.509 trust chain verification HTTP API server")]
pub struct ServerConfig {
    /// Server bind address
    #[arg(long, env = "CERTCHECK_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Server port
    #[arg(short, long, env = "CERTCHECK_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Timeout in seconds for each issuer certificate download
    #[arg(long, env = "CERTCHECK_FETCH_TIMEOUT_SECS", default_value_t = 10)]
    pub fetch_timeout_secs: u64,

    /// Maximum accepted request body size in bytes
    #[arg(long, env = "CERTCHECK_MAX_BODY_BYTES", default_value_t = 1024 * 1024)]
    pub max_body_bytes: usize,

    /// Runtime environment; `production` switches logs to JSON
    #[arg(long, env = "CERTCHECK_ENV", default_value = "development")]
    pub environment: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 8080,
            fetch_timeout_secs: 10,
            max_body_bytes: 1024 * 1024,
            environment: "development".to_string(),
            verbose: false,
        }
    }
}
