//! Filesystem path constants.

// ─── Server ────────────────────────────────────────────────────────────────

/// Default config file path for the server.
pub const DEFAULT_SERVER_CONFIG: &str = "/etc/corral/config.yaml";

/// Default certificate directory for the server (root CA + manager identity).
pub const DEFAULT_SERVER_CERT_DIR: &str = "/var/lib/corral/certs";

// ─── Agent ────────────────────────────────────────────────────────────────

/// Default config file path for the agent.
pub const DEFAULT_AGENT_CONFIG: &str = "/etc/corral/agent-config.yaml";

/// Directory prefix for per-node TLS certificate storage.
/// Full path = `AGENT_CERT_DIR_PREFIX + node_name`.
pub const AGENT_CERT_DIR_PREFIX: &str = "/tmp/corral-agent-";

// ─── Certificate file names (shared layout) ────────────────────────────────

/// Root CA certificate file name.
pub const ROOT_CA_CERT_FILE: &str = "rootCA.crt";

/// Root CA private key file name.
pub const ROOT_CA_KEY_FILE: &str = "rootCA.key";

/// Node (or manager) certificate file name.
pub const NODE_CERT_FILE: &str = "node.crt";

/// Node (or manager) private key file name.
pub const NODE_KEY_FILE: &str = "node.key";

/// Node certificate signing request file name.
pub const NODE_CSR_FILE: &str = "node.csr";
