//! CA service: the RPC surface peers use to fetch the cluster root
//! certificate and have CSRs signed.

pub mod auth;
pub mod handlers;
pub mod server;

use std::sync::Arc;

use pkg_pki::SecurityConfig;

/// Shared application state injected into all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub security: Arc<SecurityConfig>,
    pub join_token: String,
}
