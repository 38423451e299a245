//! Root certificate authority for the cluster.

use std::path::Path;

use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DnType, IsCa, KeyPair, KeyUsagePurpose,
};
use time::{Duration, OffsetDateTime};
use tracing::info;

use crate::error::CaError;
use crate::fingerprint::sha256_hex;
use crate::store;

/// Root CA validity window.
const ROOT_VALIDITY_DAYS: i64 = 3650;

/// Backdate certificates slightly to tolerate clock skew between nodes.
pub(crate) const CLOCK_SKEW_GRACE: Duration = Duration::minutes(5);

/// The cluster's root of trust.
///
/// A `RootCa` is either fully signing-capable (created locally, or reloaded
/// from cert + key) or certificate-only (loaded from a cert file, or acquired
/// from a remote peer through fingerprint-verified bootstrap). Construction
/// either yields a valid value or fails; no partially-initialized instance
/// escapes.
#[derive(Debug)]
pub struct RootCa {
    cert_pem: String,
    signer: Option<CaSigner>,
}

/// Signing half of the root CA: the private key and the issuer certificate.
/// Immutable after load; concurrent signing needs no locking.
pub(crate) struct CaSigner {
    pub(crate) key_pair: KeyPair,
    pub(crate) cert: Certificate,
}

impl std::fmt::Debug for CaSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaSigner").finish_non_exhaustive()
    }
}

impl RootCa {
    /// Generate a fresh root CA for a cluster named `common_name`, persisting
    /// the certificate and private key to the given paths.
    pub fn create(cert_path: &Path, key_path: &Path, common_name: &str) -> Result<Self, CaError> {
        info!("Generating cluster root CA (CN={})", common_name);

        let key_pair = KeyPair::generate().map_err(CaError::Generation)?;
        let params = root_params(common_name);
        let cert = params.self_signed(&key_pair).map_err(CaError::Generation)?;
        let cert_pem = cert.pem();

        store::write_certificate(cert_path, cert_pem.as_bytes())?;
        store::write_private_key(key_path, key_pair.serialize_pem().as_bytes())?;

        info!("Cluster root CA written to {}", cert_path.display());

        Ok(Self {
            cert_pem,
            signer: Some(CaSigner { key_pair, cert }),
        })
    }

    /// Read an existing root certificate from disk. Performs no key loading;
    /// the returned value cannot sign.
    pub fn from_disk_cert(cert_path: &Path) -> Result<Self, CaError> {
        let bytes = store::read_pem(cert_path)?;
        Self::from_pem(&bytes)
    }

    /// Parse-validate raw PEM bytes into a certificate-only root CA.
    ///
    /// The stored PEM is kept byte-identical to the input so the fingerprint
    /// of a bootstrapped root matches what the remote peer serves.
    pub fn from_pem(bytes: &[u8]) -> Result<Self, CaError> {
        let (_, pem) = x509_parser::pem::parse_x509_pem(bytes)
            .map_err(|e| CaError::InvalidCertificate(e.to_string()))?;
        pem.parse_x509()
            .map_err(|e| CaError::InvalidCertificate(e.to_string()))?;
        let cert_pem = String::from_utf8(bytes.to_vec())
            .map_err(|e| CaError::InvalidCertificate(e.to_string()))?;
        Ok(Self {
            cert_pem,
            signer: None,
        })
    }

    /// Reload a signing-capable root CA from its persisted certificate and
    /// private key. Used by a manager restarting with existing state.
    pub fn load(cert_path: &Path, key_path: &Path) -> Result<Self, CaError> {
        let cert_bytes = store::read_pem(cert_path)?;
        let cert_pem = String::from_utf8(cert_bytes)
            .map_err(|e| CaError::InvalidCertificate(e.to_string()))?;
        let key_pem = store::read_pem(key_path)?;
        let key_str = String::from_utf8(key_pem)
            .map_err(|_| CaError::InvalidKey(rcgen::Error::CouldNotParseKeyPair))?;

        let key_pair = KeyPair::from_pem(&key_str).map_err(CaError::InvalidKey)?;
        let params = CertificateParams::from_ca_cert_pem(&cert_pem)
            .map_err(|e| CaError::InvalidCertificate(e.to_string()))?;
        // Re-signing with the original key yields an issuer handle whose
        // subject and public key match the on-disk root, which is all chain
        // verification depends on. The served bytes stay the on-disk PEM.
        let cert = params.self_signed(&key_pair).map_err(CaError::Generation)?;

        Ok(Self {
            cert_pem,
            signer: Some(CaSigner { key_pair, cert }),
        })
    }

    /// The root certificate PEM, byte-identical to what is stored and served.
    pub fn cert_pem(&self) -> &str {
        &self.cert_pem
    }

    /// Whether this value holds the root private key.
    pub fn can_sign(&self) -> bool {
        self.signer.is_some()
    }

    /// Hex-encoded SHA-256 over the certificate PEM bytes, recomputed on
    /// demand. This is the value an operator hands to joining nodes.
    pub fn fingerprint(&self) -> String {
        sha256_hex(self.cert_pem.as_bytes())
    }

    pub(crate) fn signer(&self) -> Result<&CaSigner, CaError> {
        self.signer.as_ref().ok_or(CaError::NoSigner)
    }
}

fn root_params(common_name: &str) -> CertificateParams {
    let mut params = CertificateParams::default();
    params
        .distinguished_name
        .push(DnType::CommonName, common_name);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
    let now = OffsetDateTime::now_utc();
    params.not_before = now - CLOCK_SKEW_GRACE;
    params.not_after = now + Duration::days(ROOT_VALIDITY_DAYS);
    params
}
