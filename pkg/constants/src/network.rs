//! Network-related constants.

/// Default port for the corral CA/API server.
pub const DEFAULT_API_PORT: u16 = 6443;

/// Default API server address (HTTP).
pub const DEFAULT_API_ADDR: &str = "http://127.0.0.1:6443";

/// Route serving the cluster root certificate (public, pre-trust).
pub const ROUTE_CA_CERTIFICATE: &str = "/v1/ca/certificate";

/// Route accepting certificate signing requests (token-protected).
pub const ROUTE_CA_SIGN: &str = "/v1/ca/sign";

/// Request timeout for the bootstrap client, in seconds.
/// An unreachable manager must fail the join, not hang it.
pub const BOOTSTRAP_TIMEOUT_SECS: u64 = 10;
