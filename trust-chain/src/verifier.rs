//! Time-pinned path validation of a discovered chain against caller roots
//!
//! Trust anchors come from the caller on every call; nothing is read from a
//! process-wide store. The chain's ancestors are offered to the validator as
//! untrusted intermediates, never as anchors.

use crate::builder::Chain;
use crate::certificate::{certificate_blocks, Certificate};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Reason returned when the bundle yields no trust anchor
pub const UNUSABLE_TRUST_BUNDLE: &str = "trust bundle contains no usable certificates";

/// Reason returned for instants the validator cannot represent
pub const REFERENCE_TIME_BEFORE_EPOCH: &str = "reference time precedes the Unix epoch";

/// Reasons for certificates outside their window, worded as the validator words them
const CERT_EXPIRED: &str = "CertExpired";
const CERT_NOT_VALID_YET: &str = "CertNotValidYet";

static SUPPORTED_SIG_ALGS: &[&webpki::SignatureAlgorithm] = &[
    &webpki::ECDSA_P256_SHA256,
    &webpki::ECDSA_P256_SHA384,
    &webpki::ECDSA_P384_SHA256,
    &webpki::ECDSA_P384_SHA384,
    &webpki::ED25519,
    &webpki::RSA_PKCS1_2048_8192_SHA256,
    &webpki::RSA_PKCS1_2048_8192_SHA384,
    &webpki::RSA_PKCS1_2048_8192_SHA512,
    &webpki::RSA_PKCS1_3072_8192_SHA384,
    &webpki::RSA_PSS_2048_8192_SHA256_LEGACY_KEY,
    &webpki::RSA_PSS_2048_8192_SHA384_LEGACY_KEY,
    &webpki::RSA_PSS_2048_8192_SHA512_LEGACY_KEY,
];

/// Caller-supplied trust anchors, scoped to a single verification
#[derive(Debug, Clone, Default)]
pub struct TrustBundle {
    certificates: Vec<Certificate>,
}

impl TrustBundle {
    /// Collect every decodable certificate of a PEM bundle
    pub fn from_pem(pem_text: &str) -> Self {
        let certificates = certificate_blocks(pem_text)
            .into_iter()
            .filter_map(|der| match Certificate::from_der(der) {
                Ok(cert) => Some(cert),
                Err(e) => {
                    debug!(error = %e, "Skipping trust bundle entry");
                    None
                }
            })
            .collect();
        Self { certificates }
    }

    /// Number of certificates found, usable as anchors or not
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    fn contains(&self, cert: &Certificate) -> bool {
        self.certificates.iter().any(|c| c.der() == cert.der())
    }

    /// Anchors whose validity window covers `instant`, and the failure kinds of
    /// those that do not
    fn anchors_at(&self, instant: DateTime<Utc>) -> (Vec<webpki::TrustAnchor<'_>>, Vec<FailureKind>) {
        let mut current = Vec::new();
        let mut stale = Vec::new();
        for cert in &self.certificates {
            let anchor = match webpki::TrustAnchor::try_from_cert_der(cert.der()) {
                Ok(anchor) => anchor,
                Err(e) => {
                    debug!(subject = %cert.subject(), error = ?e, "Certificate unusable as trust anchor");
                    continue;
                }
            };
            match window_failure(cert, instant) {
                None => current.push(anchor),
                Some(kind) => {
                    debug!(subject = %cert.subject(), %kind, "Trust anchor outside its validity window");
                    stale.push(kind);
                }
            }
        }
        (current, stale)
    }

    fn all_anchors(&self) -> Vec<webpki::TrustAnchor<'_>> {
        self.certificates
            .iter()
            .filter_map(|cert| webpki::TrustAnchor::try_from_cert_der(cert.der()).ok())
            .collect()
    }
}

fn window_failure(cert: &Certificate, instant: DateTime<Utc>) -> Option<FailureKind> {
    if instant < cert.not_before() {
        Some(FailureKind::NotYetValid)
    } else if instant > cert.not_after() {
        Some(FailureKind::Expired)
    } else {
        None
    }
}

/// Coarse classification of a failed verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnusableTrustBundle,
    Expired,
    NotYetValid,
    UnknownIssuer,
    Malformed,
    Other,
}

impl FailureKind {
    fn from_webpki(error: webpki::Error) -> Self {
        match error {
            webpki::Error::CertExpired => Self::Expired,
            webpki::Error::CertNotValidYet => Self::NotYetValid,
            webpki::Error::UnknownIssuer => Self::UnknownIssuer,
            webpki::Error::BadDer
            | webpki::Error::BadDerTime
            | webpki::Error::UnsupportedCertVersion
            | webpki::Error::UnsupportedCriticalExtension
            | webpki::Error::InvalidCertValidity
            | webpki::Error::MissingOrMalformedExtensions => Self::Malformed,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UnusableTrustBundle => "unusable_trust_bundle",
            Self::Expired => "expired",
            Self::NotYetValid => "not_yet_valid",
            Self::UnknownIssuer => "unknown_issuer",
            Self::Malformed => "malformed",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Result of path validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Valid,
    Invalid {
        kind: FailureKind,
        /// Validator failure text, passed through unchanged
        reason: String,
    },
}

impl VerificationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    fn invalid(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self::Invalid {
            kind,
            reason: reason.into(),
        }
    }

    fn outside_window(kind: FailureKind) -> Self {
        let reason = if kind == FailureKind::NotYetValid {
            CERT_NOT_VALID_YET
        } else {
            CERT_EXPIRED
        };
        Self::invalid(kind, reason)
    }
}

/// Path validator pinned to a caller-chosen instant
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainVerifier;

impl ChainVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Validate `chain` against the anchors in `bundle` as of `reference_time`
    ///
    /// Every certificate of the chain and the anchor that terminates the path
    /// must be inside its validity window at `reference_time`. A subject that
    /// is itself a bundle certificate is trusted directly.
    pub fn verify(
        &self,
        chain: &Chain,
        bundle: &TrustBundle,
        reference_time: DateTime<Utc>,
    ) -> VerificationOutcome {
        info!(chain_len = chain.len(), %reference_time, "Verifying trust chain");

        if bundle.is_empty() {
            warn!("Trust bundle contains no certificates");
            return VerificationOutcome::invalid(FailureKind::UnusableTrustBundle, UNUSABLE_TRUST_BUNDLE);
        }

        let Ok(seconds) = u64::try_from(reference_time.timestamp()) else {
            return VerificationOutcome::invalid(FailureKind::Malformed, REFERENCE_TIME_BEFORE_EPOCH);
        };

        if bundle.contains(chain.subject()) {
            debug!(subject = %chain.subject().subject(), "Subject is a trust bundle certificate");
            return match window_failure(chain.subject(), reference_time) {
                None => VerificationOutcome::Valid,
                Some(kind) => VerificationOutcome::outside_window(kind),
            };
        }

        let (anchors, stale) = bundle.anchors_at(reference_time);
        if anchors.is_empty() && stale.is_empty() {
            warn!(certificates = bundle.len(), "Trust bundle yielded no trust anchors");
            return VerificationOutcome::invalid(FailureKind::UnusableTrustBundle, UNUSABLE_TRUST_BUNDLE);
        }

        let subject = match webpki::EndEntityCert::try_from(chain.subject().der()) {
            Ok(cert) => cert,
            Err(e) => {
                warn!(error = %e, "Subject certificate rejected by validator");
                return VerificationOutcome::invalid(FailureKind::from_webpki(e), e.to_string());
            }
        };

        let intermediates: Vec<&[u8]> = chain.ancestors().iter().map(Certificate::der).collect();
        let time = webpki::Time::from_seconds_since_unix_epoch(seconds);

        let result = if anchors.is_empty() {
            Err(webpki::Error::UnknownIssuer)
        } else {
            validate_path(&subject, &anchors, &intermediates, time)
        };

        match result {
            Ok(()) => {
                if let Some((cert, kind)) = chain
                    .iter()
                    .find_map(|cert| window_failure(cert, reference_time).map(|kind| (cert, kind)))
                {
                    warn!(subject = %cert.subject(), %kind, "Chain certificate outside its validity window");
                    return VerificationOutcome::outside_window(kind);
                }
                info!(anchors = anchors.len(), intermediates = intermediates.len(), "Trust chain verified");
                VerificationOutcome::Valid
            }
            Err(webpki::Error::UnknownIssuer)
                if !stale.is_empty()
                    && validate_path(&subject, &bundle.all_anchors(), &intermediates, time).is_ok() =>
            {
                // Only an anchor outside its window completes the path
                let kind = if stale.contains(&FailureKind::Expired) {
                    FailureKind::Expired
                } else {
                    FailureKind::NotYetValid
                };
                warn!(%kind, "Trust chain ends at an anchor outside its validity window");
                VerificationOutcome::outside_window(kind)
            }
            Err(e) => {
                warn!(error = %e, "Trust chain verification failed");
                VerificationOutcome::invalid(FailureKind::from_webpki(e), e.to_string())
            }
        }
    }
}

fn validate_path(
    subject: &webpki::EndEntityCert<'_>,
    anchors: &[webpki::TrustAnchor<'_>],
    intermediates: &[&[u8]],
    time: webpki::Time,
) -> Result<(), webpki::Error> {
    subject.verify_is_valid_tls_server_cert(
        SUPPORTED_SIG_ALGS,
        &webpki::TlsServerTrustAnchors(anchors),
        intermediates,
        time,
    )
}
