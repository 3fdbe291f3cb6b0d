//! Trust chain discovery and verification for X.509 certificates
//!
//! This crate answers one question: was a presented certificate trustworthy,
//! against a caller-supplied set of roots, at a caller-chosen instant?
//!
//! - [`ChainBuilder`] follows the Authority Information Access `caIssuers`
//!   pointers of a leaf certificate and fetches up to
//!   [`MAX_ISSUER_FETCHES`] issuer certificates.
//! - [`ChainVerifier`] validates the resulting chain against the roots of a
//!   [`TrustBundle`] with the validity windows evaluated at the reference time.
//! - [`CertificateChecker`] runs both phases for a PEM subject and bundle.
//!
//! Revocation (OCSP/CRL) is not checked and fetched issuers are not cached.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trust_chain::{CertificateChecker, HttpIssuerFetcher};
//!
//! # async fn run(subject_pem: &str, roots_pem: &str) -> Result<(), trust_chain::CheckError> {
//! let checker = CertificateChecker::new(Arc::new(HttpIssuerFetcher::default()));
//! let result = checker.check(subject_pem, roots_pem, chrono::Utc::now()).await?;
//! if !result.ok {
//!     eprintln!("certificate rejected: {}", result.message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod certificate;
pub mod check;
pub mod error;
pub mod fetch;
pub mod verifier;

#[cfg(test)]
mod test_support;

pub use builder::{Chain, ChainBuilder, MAX_ISSUER_FETCHES};
pub use certificate::Certificate;
pub use check::{CertificateChecker, CheckResult};
pub use error::{CertificateError, CheckError, FetchError};
pub use fetch::{HttpIssuerFetcher, IssuerFetcher, DEFAULT_FETCH_TIMEOUT};
pub use verifier::{ChainVerifier, FailureKind, TrustBundle, VerificationOutcome};
