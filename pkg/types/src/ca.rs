use serde::{Deserialize, Serialize};

// --- Signing messages ---

/// Body of `POST /v1/ca/sign`.
///
/// The CSR carries only a public key to certify. Any subject fields embedded
/// in it are ignored by the server: the issued identity is derived from
/// `node_name` and `role`, which the join token authorizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignCertificateRequest {
    pub node_name: String,
    pub role: NodeRole,
    pub csr_pem: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignCertificateResponse {
    pub certificate_pem: String,
}

// --- Node role ---

/// Role a certificate is issued for. Encoded into the certificate's
/// organizational unit so peers can authorize by role at the TLS layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Manager,
    Node,
}

impl NodeRole {
    /// The organizational-unit string placed in issued certificates.
    pub fn organizational_unit(&self) -> &'static str {
        match self {
            NodeRole::Manager => "manager",
            NodeRole::Node => "node",
        }
    }
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.organizational_unit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&NodeRole::Manager).unwrap(), "\"manager\"");
        assert_eq!(serde_json::to_string(&NodeRole::Node).unwrap(), "\"node\"");
    }

    #[test]
    fn sign_request_round_trips() {
        let req = SignCertificateRequest {
            node_name: "worker-1".to_string(),
            role: NodeRole::Node,
            csr_pem: "-----BEGIN CERTIFICATE REQUEST-----".to_string(),
        };
        let json = serde_json::to_string(&req).unwrap();
        let back: SignCertificateRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.node_name, "worker-1");
        assert_eq!(back.role, NodeRole::Node);
    }
}
