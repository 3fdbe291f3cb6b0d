//! Certificate graph fixtures for the workspace test suites
//!
//! Every certificate minted here carries at least one extension (a SAN on
//! leaves, basic constraints on authorities) unless built with
//! [`CertSpec::bare`], since the path validator rejects v3 certificates
//! without an extensions block.

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use rcgen::{
    date_time_ymd, BasicConstraints, CertificateParams, CustomExtension, DistinguishedName,
    DnType, IsCa, KeyPair,
};

/// id-pe-authorityInfoAccess
const AIA_OID: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 1, 1];
/// id-ad-caIssuers, DER encoded with tag and length
const CA_ISSUERS_METHOD: &[u8] = &[0x06, 0x08, 0x2b, 0x06, 0x01, 0x05, 0x05, 0x07, 0x30, 0x02];

/// Calendar date as (year, month, day)
pub type Ymd = (i32, u8, u8);

pub struct CertSpec {
    pub common_name: String,
    pub not_before: Ymd,
    pub not_after: Ymd,
    pub is_ca: bool,
    pub dns_names: Vec<String>,
    pub extensions: Vec<CustomExtension>,
}

impl CertSpec {
    /// End-entity certificate valid 2020-2040 with a DNS SAN
    pub fn leaf(common_name: &str) -> Self {
        Self {
            common_name: common_name.to_string(),
            not_before: (2020, 1, 1),
            not_after: (2040, 1, 1),
            is_ca: false,
            dns_names: vec!["leaf.example.test".to_string()],
            extensions: Vec::new(),
        }
    }

    /// CA certificate valid 2015-2045
    pub fn authority(common_name: &str) -> Self {
        Self {
            is_ca: true,
            not_before: (2015, 1, 1),
            not_after: (2045, 1, 1),
            dns_names: Vec::new(),
            ..Self::leaf(common_name)
        }
    }

    /// End-entity certificate encoded without any extensions
    pub fn bare(common_name: &str) -> Self {
        Self {
            dns_names: Vec::new(),
            ..Self::leaf(common_name)
        }
    }

    #[must_use]
    pub fn valid_between(mut self, not_before: Ymd, not_after: Ymd) -> Self {
        self.not_before = not_before;
        self.not_after = not_after;
        self
    }

    /// Add an Authority Information Access extension with one caIssuers URI
    #[must_use]
    pub fn pointing_to(mut self, url: &str) -> Self {
        self.extensions.push(aia_extension(&[url]));
        self
    }

    fn into_params(self) -> CertificateParams {
        let mut params = CertificateParams::new(self.dns_names).expect("certificate params");
        let mut name = DistinguishedName::new();
        name.push(DnType::CommonName, self.common_name);
        params.distinguished_name = name;
        params.not_before = date_time_ymd(self.not_before.0, self.not_before.1, self.not_before.2);
        params.not_after = date_time_ymd(self.not_after.0, self.not_after.1, self.not_after.2);
        if self.is_ca {
            params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        }
        params.custom_extensions = self.extensions;
        params
    }
}

/// A generated certificate with its signing key
pub struct Issued {
    pub der: Vec<u8>,
    pub pem: String,
    cert: rcgen::Certificate,
    key: KeyPair,
}

pub fn self_signed(spec: CertSpec) -> Issued {
    let key = KeyPair::generate().expect("key generation");
    let cert = spec.into_params().self_signed(&key).expect("self-signed certificate");
    Issued {
        der: cert.der().to_vec(),
        pem: cert.pem(),
        cert,
        key,
    }
}

pub fn issued_by(spec: CertSpec, issuer: &Issued) -> Issued {
    let key = KeyPair::generate().expect("key generation");
    let cert = spec
        .into_params()
        .signed_by(&key, &issuer.cert, &issuer.key)
        .expect("issued certificate");
    Issued {
        der: cert.der().to_vec(),
        pem: cert.pem(),
        cert,
        key,
    }
}

/// Self-signed when `issuer` is `None`
pub fn mint(spec: CertSpec, issuer: Option<&Issued>) -> Issued {
    match issuer {
        Some(parent) => issued_by(spec, parent),
        None => self_signed(spec),
    }
}

/// Authority Information Access extension carrying one caIssuers URI per url
pub fn aia_extension(urls: &[&str]) -> CustomExtension {
    let mut descriptions = Vec::new();
    for url in urls {
        let mut description = CA_ISSUERS_METHOD.to_vec();
        description.extend(der_tlv(0x86, url.as_bytes()));
        descriptions.extend(der_tlv(0x30, &description));
    }
    CustomExtension::from_oid_content(AIA_OID, der_tlv(0x30, &descriptions))
}

#[allow(clippy::cast_possible_truncation)]
fn der_tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let len = content.len();
    let mut out = vec![tag];
    if len < 0x80 {
        out.push(len as u8);
    } else if len <= 0xff {
        out.extend([0x81, len as u8]);
    } else {
        out.extend([0x82, (len >> 8) as u8, (len & 0xff) as u8]);
    }
    out.extend_from_slice(content);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_urls_use_long_form_lengths() {
        let url = format!("http://pki.example.test/{}", "a".repeat(200));
        let issued = self_signed(CertSpec::leaf("Long Pointer").pointing_to(&url));
        let needle = url.as_bytes();
        assert!(issued.der.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn test_bare_certificate_has_no_extensions_block() {
        let bare = self_signed(CertSpec::bare("Bare"));
        let leaf = self_signed(CertSpec::leaf("Leaf"));
        // SAN extension OID 2.5.29.17
        let san = [0x06, 0x03, 0x55, 0x1d, 0x11];
        assert!(!bare.der.windows(san.len()).any(|w| w == san));
        assert!(leaf.der.windows(san.len()).any(|w| w == san));
    }
}
