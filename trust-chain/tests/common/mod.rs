//! In-memory issuer source for trust-chain integration tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use trust_chain::{FetchError, IssuerFetcher};

/// In-memory issuer repository keyed by URL
#[derive(Default)]
pub struct MapFetcher {
    pub bodies: HashMap<String, Vec<u8>>,
    pub calls: AtomicUsize,
}

impl MapFetcher {
    pub fn publish(mut self, url: &str, der: &[u8]) -> Self {
        self.bodies.insert(url.to_string(), der.to_vec());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IssuerFetcher for MapFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bodies.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}
