//! CSR validation and leaf certificate issuance.

use std::path::Path;

use rcgen::{
    CertificateParams, CertificateSigningRequestParams, DistinguishedName, DnType,
    ExtendedKeyUsagePurpose, IsCa, KeyPair, KeyUsagePurpose, SanType,
};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::ca::{CLOCK_SKEW_GRACE, RootCa};
use crate::csr;
use crate::error::CaError;
use crate::store;

/// Issued leaf certificates are short-lived relative to the root.
const LEAF_VALIDITY_DAYS: i64 = 90;

/// Parse and validate a PEM CSR, then issue a certificate under the given
/// root with Subject CN exactly `common_name` and a single OU entry exactly
/// `organizational_unit`.
///
/// The issued subject is rebuilt from scratch from the two parameters. A CSR
/// legitimately arrives from an untrusted node and may carry any CN, O, OU,
/// or SAN it likes; none of those fields survive into the certificate. Only
/// the requester's public key is taken from the CSR.
pub fn parse_validate_and_sign_csr(
    root_ca: &RootCa,
    csr_pem: &str,
    common_name: &str,
    organizational_unit: &str,
) -> Result<String, CaError> {
    let signer = root_ca.signer()?;

    let mut request =
        CertificateSigningRequestParams::from_pem(csr_pem).map_err(CaError::InvalidCsr)?;
    request.params = leaf_params(common_name, organizational_unit)?;

    let cert = request
        .signed_by(&signer.cert, &signer.key_pair)
        .map_err(CaError::Signing)?;

    debug!(
        "Issued certificate (CN={}, OU={})",
        common_name, organizational_unit
    );
    Ok(cert.pem())
}

/// Generate a key pair and CSR locally and sign it in one step, persisting
/// certificate and key under the standard permission policy. Used by a
/// manager issuing its own operational TLS certificate.
pub fn generate_and_sign_new_tls_cert(
    root_ca: &RootCa,
    cert_path: &Path,
    key_path: &Path,
    common_name: &str,
    organizational_unit: &str,
) -> Result<(String, KeyPair), CaError> {
    let (csr_pem, key_pair) = csr::generate_csr()?;
    let cert_pem =
        parse_validate_and_sign_csr(root_ca, &csr_pem, common_name, organizational_unit)?;
    store::write_certificate(cert_path, cert_pem.as_bytes())?;
    store::write_private_key(key_path, key_pair.serialize_pem().as_bytes())?;
    Ok((cert_pem, key_pair))
}

/// Authority-controlled certificate template: exactly two subject attributes
/// (CN + OU), a SAN for the CN, and a bounded validity window.
fn leaf_params(common_name: &str, organizational_unit: &str) -> Result<CertificateParams, CaError> {
    let mut params = CertificateParams::default();
    params.distinguished_name = DistinguishedName::new();
    params
        .distinguished_name
        .push(DnType::CommonName, common_name);
    params
        .distinguished_name
        .push(DnType::OrganizationalUnitName, organizational_unit);
    params.is_ca = IsCa::NoCa;
    params.key_usages = vec![
        KeyUsagePurpose::DigitalSignature,
        KeyUsagePurpose::KeyEncipherment,
    ];
    params.extended_key_usages = vec![
        ExtendedKeyUsagePurpose::ServerAuth,
        ExtendedKeyUsagePurpose::ClientAuth,
    ];
    params.subject_alt_names = vec![SanType::DnsName(
        common_name.try_into().map_err(CaError::Signing)?,
    )];
    let now = OffsetDateTime::now_utc();
    params.not_before = now - CLOCK_SKEW_GRACE;
    params.not_after = now + Duration::days(LEAF_VALIDITY_DAYS);
    Ok(params)
}
