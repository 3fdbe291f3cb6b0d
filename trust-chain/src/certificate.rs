//! Certificate parsing shared by the chain builder and verifier.
//!
//! A [`Certificate`] keeps its DER encoding (the verifier hands it to the
//! path-validation primitive) together with the handful of attributes the
//! builder and the logs need, extracted once at parse time.

use crate::error::{CertificateError, Result};
use chrono::{DateTime, Utc};
use x509_parser::extensions::{GeneralName, ParsedExtension};
use x509_parser::prelude::{FromDer, X509Certificate};

/// id-ad-caIssuers access method
const CA_ISSUERS_OID: &str = "1.3.6.1.5.5.7.48.2";

/// Parsed, immutable X.509 certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
    subject: String,
    issuer: String,
    issuer_urls: Vec<String>,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
}

impl Certificate {
    /// Parse the first PEM block of `pem_text` as a certificate
    ///
    /// # Errors
    ///
    /// Returns [`CertificateError::InvalidPem`] when no PEM block can be
    /// decoded and a parse error when the block is not a valid certificate.
    pub fn from_pem(pem_text: &str) -> Result<Self> {
        let block = pem::parse(pem_text).map_err(|e| CertificateError::InvalidPem(e.to_string()))?;
        Self::from_der(block.into_contents())
    }

    /// Parse a single DER-encoded certificate
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not exactly one well-formed certificate.
    pub fn from_der(der: Vec<u8>) -> Result<Self> {
        let (rem, cert) = X509Certificate::from_der(&der)
            .map_err(|e| CertificateError::Parse(e.to_string()))?;
        if !rem.is_empty() {
            return Err(CertificateError::TrailingData(rem.len()));
        }

        let not_before = DateTime::<Utc>::from_timestamp(cert.validity().not_before.timestamp(), 0)
            .ok_or(CertificateError::InvalidValidity)?;
        let not_after = DateTime::<Utc>::from_timestamp(cert.validity().not_after.timestamp(), 0)
            .ok_or(CertificateError::InvalidValidity)?;

        let subject = cert.subject().to_string();
        let issuer = cert.issuer().to_string();
        let issuer_urls = extract_issuer_urls(&cert);

        Ok(Self {
            der,
            subject,
            issuer,
            issuer_urls,
            not_before,
            not_after,
        })
    }

    /// DER encoding as received
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// `caIssuers` URIs from the Authority Information Access extension, in
    /// certificate order
    pub fn issuer_urls(&self) -> &[String] {
        &self.issuer_urls
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// Whether `instant` falls inside the validity window (bounds inclusive)
    pub fn is_valid_at(&self, instant: DateTime<Utc>) -> bool {
        self.not_before <= instant && instant <= self.not_after
    }

    /// Subject and issuer names are equal
    pub fn is_self_issued(&self) -> bool {
        self.subject == self.issuer
    }
}

fn extract_issuer_urls(cert: &X509Certificate<'_>) -> Vec<String> {
    let mut urls = Vec::new();
    for ext in cert.extensions() {
        if let ParsedExtension::AuthorityInfoAccess(aia) = ext.parsed_extension() {
            for desc in &aia.accessdescs {
                if desc.access_method.to_id_string() != CA_ISSUERS_OID {
                    continue;
                }
                if let GeneralName::URI(uri) = &desc.access_location {
                    urls.push((*uri).to_string());
                }
            }
        }
    }
    urls
}

const PEM_BEGIN: &str = "-----BEGIN ";
const PEM_END: &str = "-----END ";
const PEM_DASHES: &str = "-----";

/// Extract every `CERTIFICATE` block of a PEM bundle as DER
///
/// Blocks are decoded one at a time: an undecodable block is skipped and the
/// remaining blocks are still returned. Text outside blocks is ignored.
pub fn certificate_blocks(pem_text: &str) -> Vec<Vec<u8>> {
    let mut blocks = Vec::new();
    let mut rest = pem_text;

    while let Some(start) = rest.find(PEM_BEGIN) {
        let Some(candidate) = rest.get(start..) else {
            break;
        };
        let Some(block_len) = pem_block_len(candidate) else {
            tracing::warn!("Unterminated PEM block in trust bundle");
            break;
        };
        let (block, remainder) = candidate.split_at(block_len);
        rest = remainder;

        match pem::parse(block) {
            Ok(parsed) if parsed.tag() == "CERTIFICATE" => blocks.push(parsed.into_contents()),
            Ok(parsed) => {
                tracing::debug!(tag = %parsed.tag(), "Skipping non-certificate PEM block");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping undecodable PEM block");
            }
        }
    }

    blocks
}

/// Length of the block at the start of `text`, through its END line
fn pem_block_len(text: &str) -> Option<usize> {
    let end = text.find(PEM_END)?;
    let label_start = end + PEM_END.len();
    let label_len = text.get(label_start..)?.find(PEM_DASHES)?;
    Some(label_start + label_len + PEM_DASHES.len())
}
