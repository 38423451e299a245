//! Standard certificate file layout under a base directory.

use std::path::{Path, PathBuf};

use pkg_constants::paths::{
    NODE_CERT_FILE, NODE_CSR_FILE, NODE_KEY_FILE, ROOT_CA_CERT_FILE, ROOT_CA_KEY_FILE,
};

/// Well-known locations of PKI artifacts inside a certificate directory.
/// Both the server and the agent use this layout.
#[derive(Debug, Clone)]
pub struct CertificatePaths {
    pub root_ca_cert: PathBuf,
    pub root_ca_key: PathBuf,
    pub node_cert: PathBuf,
    pub node_key: PathBuf,
    pub node_csr: PathBuf,
}

impl CertificatePaths {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            root_ca_cert: base_dir.join(ROOT_CA_CERT_FILE),
            root_ca_key: base_dir.join(ROOT_CA_KEY_FILE),
            node_cert: base_dir.join(NODE_CERT_FILE),
            node_key: base_dir.join(NODE_KEY_FILE),
            node_csr: base_dir.join(NODE_CSR_FILE),
        }
    }
}
