//! Certificate signing request issuance.
//!
//! A joining node generates its key pair and CSR locally; the private key
//! never leaves the node. The CSR subject is left empty on purpose: identity
//! is assigned by the signing authority, not requested by the node.

use std::path::Path;

use rcgen::{CertificateParams, KeyPair};
use tracing::debug;

use crate::error::CaError;
use crate::store;

/// Generate a fresh key pair and a PEM-encoded CSR with an empty subject.
pub fn generate_csr() -> Result<(String, KeyPair), CaError> {
    let key_pair = KeyPair::generate().map_err(CaError::Generation)?;
    let params = CertificateParams::default();
    let request = params
        .serialize_request(&key_pair)
        .map_err(CaError::Generation)?;
    let csr_pem = request.pem().map_err(CaError::Generation)?;
    Ok((csr_pem, key_pair))
}

/// Generate a key pair and CSR and persist both: the CSR under the
/// certificate permission policy, the key under the key policy.
pub fn generate_and_write_csr(
    csr_path: &Path,
    key_path: &Path,
) -> Result<(String, KeyPair), CaError> {
    let (csr_pem, key_pair) = generate_csr()?;
    store::write_csr(csr_path, csr_pem.as_bytes())?;
    store::write_private_key(key_path, key_pair.serialize_pem().as_bytes())?;
    debug!("CSR written to {}", csr_path.display());
    Ok((csr_pem, key_pair))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::CertificatePaths;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use x509_parser::prelude::*;

    #[test]
    fn written_csr_enforces_permission_policy() {
        let dir = tempfile::tempdir().unwrap();
        let paths = CertificatePaths::new(dir.path());

        let (csr_pem, _key) = generate_and_write_csr(&paths.node_csr, &paths.node_key).unwrap();
        assert!(!csr_pem.is_empty());

        let csr_mode = fs::metadata(&paths.node_csr).unwrap().permissions().mode();
        assert_eq!(csr_mode & 0o022, 0, "CSR must not be group/other writable");

        let key_mode = fs::metadata(&paths.node_key).unwrap().permissions().mode();
        assert_eq!(key_mode & 0o044, 0, "key must not be group/other readable");
    }

    #[test]
    fn written_csr_round_trips_through_independent_decoder() {
        let dir = tempfile::tempdir().unwrap();
        let paths = CertificatePaths::new(dir.path());

        generate_and_write_csr(&paths.node_csr, &paths.node_key).unwrap();

        let bytes = fs::read(&paths.node_csr).unwrap();
        let (_, pem) = x509_parser::pem::parse_x509_pem(&bytes).unwrap();
        let (_, csr) = X509CertificationRequest::from_der(&pem.contents).unwrap();

        // Embedded public key survives the disk round-trip intact.
        assert!(!csr
            .certification_request_info
            .subject_pki
            .subject_public_key
            .data
            .is_empty());
        csr.verify_signature().unwrap();
    }
}
