//! Issuer chain discovery
//!
//! Starting from a leaf certificate, the builder follows the first
//! `caIssuers` URI of each certificate, fetches the DER certificate published
//! there and appends it. Traversal is best effort: any fetch or parse failure
//! ends it and the chain collected so far is returned. The chain is not
//! authenticated here; every fetched certificate is untrusted path material
//! until the verifier has run.

use crate::certificate::Certificate;
use crate::fetch::IssuerFetcher;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Upper bound on issuer fetches per chain
pub const MAX_ISSUER_FETCHES: usize = 5;

/// Leaf-first sequence of certificates; never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    subject: Certificate,
    ancestors: Vec<Certificate>,
}

impl Chain {
    /// Chain holding only the subject certificate
    pub fn new(subject: Certificate) -> Self {
        Self {
            subject,
            ancestors: Vec::new(),
        }
    }

    /// The certificate being validated (index 0)
    pub fn subject(&self) -> &Certificate {
        &self.subject
    }

    /// Discovered issuers, in discovery order
    pub fn ancestors(&self) -> &[Certificate] {
        &self.ancestors
    }

    pub fn len(&self) -> usize {
        1 + self.ancestors.len()
    }

    /// Always false; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &Certificate> {
        std::iter::once(&self.subject).chain(self.ancestors.iter())
    }

    fn last(&self) -> &Certificate {
        self.ancestors.last().unwrap_or(&self.subject)
    }

    pub(crate) fn push(&mut self, issuer: Certificate) {
        self.ancestors.push(issuer);
    }
}

/// Walks issuer pointers through an [`IssuerFetcher`]
#[derive(Clone)]
pub struct ChainBuilder {
    fetcher: Arc<dyn IssuerFetcher>,
}

impl ChainBuilder {
    pub fn new(fetcher: Arc<dyn IssuerFetcher>) -> Self {
        Self { fetcher }
    }

    /// Reconstruct the issuer chain of `leaf`
    ///
    /// Never fails: a chain of length one means no issuer could be
    /// discovered, which is a legitimate result for self-signed roots.
    pub async fn build_chain(&self, leaf: Certificate) -> Chain {
        info!(subject = %leaf.subject(), "Building trust chain");
        let mut chain = Chain::new(leaf);

        for hop in 0..MAX_ISSUER_FETCHES {
            let Some(url) = chain
                .last()
                .issuer_urls()
                .first()
                .filter(|url| !url.is_empty())
                .cloned()
            else {
                debug!(depth = chain.len(), "No parent certificate URL found");
                return chain;
            };

            let body = match self.fetcher.fetch(&url).await {
                Ok(body) => body,
                Err(e) => {
                    warn!(url = %url, hop, error = %e, "Failed to fetch issuer certificate");
                    return chain;
                }
            };

            match Certificate::from_der(body) {
                Ok(issuer) => {
                    debug!(url = %url, hop, subject = %issuer.subject(), "Adding retrieved parent certificate");
                    chain.push(issuer);
                }
                Err(e) => {
                    warn!(url = %url, hop, error = %e, "Fetched issuer is not a DER certificate");
                    return chain;
                }
            }
        }

        if chain.last().issuer_urls().first().is_some_and(|url| !url.is_empty()) {
            info!(
                max_fetches = MAX_ISSUER_FETCHES,
                "Maximum length of trust chain reached"
            );
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{issued_by, self_signed, CertSpec, StaticFetcher};

    fn parse(der: &[u8]) -> Certificate {
        Certificate::from_der(der.to_vec()).expect("parse")
    }

    #[tokio::test]
    async fn test_chain_without_issuer_url_is_leaf_only() {
        let leaf = parse(&self_signed(CertSpec::leaf("Lonely")).der);
        let fetcher = Arc::new(StaticFetcher::default());
        let builder = ChainBuilder::new(fetcher.clone());

        let chain = builder.build_chain(leaf.clone()).await;

        assert_eq!(chain.len(), 1);
        assert_eq!(chain.subject(), &leaf);
        assert!(chain.ancestors().is_empty());
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_chain_follows_issuer_urls_to_root() {
        let root = self_signed(CertSpec::authority("Root CA"));
        let middle = issued_by(
            CertSpec::authority("Middle CA").pointing_to("http://pki.test/root.der"),
            &root,
        );
        let lower = issued_by(
            CertSpec::authority("Lower CA").pointing_to("http://pki.test/middle.der"),
            &middle,
        );
        let leaf = issued_by(
            CertSpec::leaf("Leaf").pointing_to("http://pki.test/lower.der"),
            &lower,
        );

        let fetcher = Arc::new(
            StaticFetcher::default()
                .with("http://pki.test/root.der", root.der.clone())
                .with("http://pki.test/middle.der", middle.der.clone())
                .with("http://pki.test/lower.der", lower.der.clone()),
        );
        let builder = ChainBuilder::new(fetcher.clone());

        let chain = builder.build_chain(parse(&leaf.der)).await;

        let ders: Vec<&[u8]> = chain.iter().map(Certificate::der).collect();
        assert_eq!(
            ders,
            vec![
                leaf.der.as_slice(),
                lower.der.as_slice(),
                middle.der.as_slice(),
                root.der.as_slice()
            ]
        );
        assert_eq!(
            fetcher.requested(),
            vec![
                "http://pki.test/lower.der".to_string(),
                "http://pki.test/middle.der".to_string(),
                "http://pki.test/root.der".to_string(),
            ]
        );

        // Same responses, same chain
        let again = builder.build_chain(parse(&leaf.der)).await;
        assert_eq!(again, chain);
    }

    #[tokio::test]
    async fn test_issuer_cycle_is_capped() {
        let looping = self_signed(CertSpec::authority("Loop CA").pointing_to("http://pki.test/loop.der"));
        let leaf = issued_by(
            CertSpec::leaf("Leaf").pointing_to("http://pki.test/loop.der"),
            &looping,
        );
        let fetcher = Arc::new(StaticFetcher::default().with("http://pki.test/loop.der", looping.der.clone()));
        let builder = ChainBuilder::new(fetcher.clone());

        let chain = builder.build_chain(parse(&leaf.der)).await;

        assert_eq!(chain.len(), MAX_ISSUER_FETCHES + 1);
        assert_eq!(fetcher.calls(), MAX_ISSUER_FETCHES);
        assert!(chain.ancestors().iter().all(|c| c.der() == looping.der.as_slice()));
    }

    #[tokio::test]
    async fn test_fetch_failure_returns_partial_chain() {
        let root = self_signed(CertSpec::authority("Root CA"));
        let middle = issued_by(
            CertSpec::authority("Middle CA").pointing_to("http://pki.test/missing.der"),
            &root,
        );
        let leaf = issued_by(
            CertSpec::leaf("Leaf").pointing_to("http://pki.test/middle.der"),
            &middle,
        );
        let fetcher = Arc::new(StaticFetcher::default().with("http://pki.test/middle.der", middle.der.clone()));
        let builder = ChainBuilder::new(fetcher.clone());

        let chain = builder.build_chain(parse(&leaf.der)).await;

        assert_eq!(chain.len(), 2);
        assert_eq!(chain.ancestors()[0].der(), middle.der.as_slice());
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_unparseable_issuer_body_stops_without_appending() {
        let root = self_signed(CertSpec::authority("Root CA"));
        let leaf = issued_by(
            CertSpec::leaf("Leaf").pointing_to("http://pki.test/root.pem"),
            &root,
        );
        // PEM text instead of DER
        let fetcher = Arc::new(
            StaticFetcher::default().with("http://pki.test/root.pem", root.pem.clone().into_bytes()),
        );
        let builder = ChainBuilder::new(fetcher.clone());

        let chain = builder.build_chain(parse(&leaf.der)).await;

        assert_eq!(chain.len(), 1);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_issuer_body_stops() {
        let root = self_signed(CertSpec::authority("Root CA"));
        let leaf = issued_by(
            CertSpec::leaf("Leaf").pointing_to("http://pki.test/empty.der"),
            &root,
        );
        let fetcher = Arc::new(StaticFetcher::default().with("http://pki.test/empty.der", Vec::new()));
        let builder = ChainBuilder::new(fetcher);

        let chain = builder.build_chain(parse(&leaf.der)).await;

        assert_eq!(chain.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_first_issuer_url_stops() {
        let leaf = self_signed(CertSpec::leaf("Leaf").pointing_to(""));
        let fetcher = Arc::new(StaticFetcher::default());
        let builder = ChainBuilder::new(fetcher.clone());

        let chain = builder.build_chain(parse(&leaf.der)).await;

        assert_eq!(chain.len(), 1);
        assert_eq!(fetcher.calls(), 0);
    }
}
