//! End-to-end certificate check: parse, build, verify
//!
//! The builder and verifier run as two strictly sequential phases, each on
//! its own task, each handing its single result back over a oneshot channel.
//! The verifier never starts before the builder's chain has been received.

use crate::builder::{Chain, ChainBuilder};
use crate::certificate::Certificate;
use crate::error::CheckError;
use crate::fetch::IssuerFetcher;
use crate::verifier::{ChainVerifier, TrustBundle, VerificationOutcome};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{info, warn};

/// Verdict returned to the HTTP layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub ok: bool,
    pub message: String,
}

impl CheckResult {
    fn from_outcome(outcome: VerificationOutcome) -> Self {
        match outcome {
            VerificationOutcome::Valid => Self {
                ok: true,
                message: String::new(),
            },
            VerificationOutcome::Invalid { kind, reason } => {
                warn!(failure = %kind, reason = %reason, "Certificate not valid");
                Self {
                    ok: false,
                    message: reason,
                }
            }
        }
    }
}

/// Combines chain discovery and verification for one subject certificate
#[derive(Clone)]
pub struct CertificateChecker {
    builder: ChainBuilder,
    verifier: ChainVerifier,
}

impl CertificateChecker {
    pub fn new(fetcher: Arc<dyn IssuerFetcher>) -> Self {
        Self {
            builder: ChainBuilder::new(fetcher),
            verifier: ChainVerifier::new(),
        }
    }

    /// Check `subject_pem` against the roots in `trust_bundle_pem` as of
    /// `reference_time`
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::InvalidSubject`] if the subject certificate cannot
    /// be decoded, and [`CheckError::Internal`] if a phase task is lost before
    /// reporting. A failed verification is an `Ok` result with `ok == false`.
    pub async fn check(
        &self,
        subject_pem: &str,
        trust_bundle_pem: &str,
        reference_time: DateTime<Utc>,
    ) -> Result<CheckResult, CheckError> {
        let subject = Certificate::from_pem(subject_pem)?;

        let chain = self.build_phase(subject).await?;
        if chain.len() == 1 {
            info!("No parent certificate found, treating subject as a root candidate");
        }

        let bundle = TrustBundle::from_pem(trust_bundle_pem);
        let outcome = self.verify_phase(chain, bundle, reference_time).await?;

        Ok(CheckResult::from_outcome(outcome))
    }

    async fn build_phase(&self, subject: Certificate) -> Result<Chain, CheckError> {
        let (tx, rx) = oneshot::channel();
        let builder = self.builder.clone();
        tokio::spawn(async move {
            let chain = builder.build_chain(subject).await;
            // Receiver only disappears if the request was dropped
            let _ = tx.send(chain);
        });

        rx.await
            .map_err(|_| CheckError::Internal("chain builder stopped before reporting".to_string()))
    }

    async fn verify_phase(
        &self,
        chain: Chain,
        bundle: TrustBundle,
        reference_time: DateTime<Utc>,
    ) -> Result<VerificationOutcome, CheckError> {
        let (tx, rx) = oneshot::channel();
        let verifier = self.verifier;
        tokio::task::spawn_blocking(move || {
            let outcome = verifier.verify(&chain, &bundle, reference_time);
            let _ = tx.send(outcome);
        });

        rx.await
            .map_err(|_| CheckError::Internal("chain verifier stopped before reporting".to_string()))
    }
}
