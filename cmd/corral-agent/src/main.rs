use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use pkg_constants::network::{DEFAULT_API_ADDR, ROUTE_CA_SIGN};
use pkg_constants::paths::{AGENT_CERT_DIR_PREFIX, DEFAULT_AGENT_CONFIG};
use pkg_pki::paths::CertificatePaths;
use pkg_pki::remote::get_remote_ca;
use pkg_pki::{SecurityConfig, csr, store};
use pkg_types::ca::{NodeRole, SignCertificateRequest, SignCertificateResponse};
use pkg_types::config::{AgentConfigFile, load_config_file};

#[derive(Parser, Debug)]
#[command(name = "corral-agent", about = "corral node agent: joins the cluster CA")]
struct Cli {
    /// Path to YAML config file
    #[arg(long, short, default_value = DEFAULT_AGENT_CONFIG)]
    config: String,

    /// Server API endpoint
    #[arg(long)]
    server: Option<String>,

    /// Join token for signing requests
    #[arg(long)]
    token: Option<String>,

    /// Node name
    #[arg(long)]
    node_name: Option<String>,

    /// Expected root CA fingerprint (hex SHA-256), obtained out-of-band
    /// alongside the join token
    #[arg(long)]
    ca_fingerprint: Option<String>,

    /// Directory for this node's certificates
    #[arg(long)]
    cert_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let file_cfg: AgentConfigFile = load_config_file(&cli.config)?;

    // Merge: CLI args > config file > defaults
    let server = cli
        .server
        .or(file_cfg.server)
        .unwrap_or_else(|| DEFAULT_API_ADDR.to_string());
    let token = cli
        .token
        .or(file_cfg.token)
        .unwrap_or_else(|| "demo-token-123".to_string());
    let node_name = cli
        .node_name
        .or(file_cfg.node_name)
        .unwrap_or_else(|| "node-1".to_string());
    let fingerprint = cli
        .ca_fingerprint
        .or(file_cfg.ca_fingerprint)
        .context("--ca-fingerprint is required: refusing to trust an unverified remote CA")?;
    let cert_dir = cli
        .cert_dir
        .or(file_cfg.cert_dir)
        .unwrap_or_else(|| format!("{}{}", AGENT_CERT_DIR_PREFIX, node_name));

    info!("Starting corral-agent for node: {}", node_name);

    // 1. Establish trust in the cluster root CA. The fingerprint check is the
    // only thing standing between us and an imposter, so a failure here is
    // terminal for this attempt; there is no unverified fallback.
    info!("Bootstrapping trust with {}", server);
    let root_ca = match get_remote_ca(&server, &fingerprint).await {
        Ok(ca) => ca,
        Err(e) => {
            error!("Trust bootstrap failed: {}", e);
            return Err(e.into());
        }
    };

    std::fs::create_dir_all(&cert_dir)?;
    let paths = CertificatePaths::new(Path::new(&cert_dir));
    store::write_certificate(&paths.root_ca_cert, root_ca.cert_pem().as_bytes())?;

    // 2. Generate our identity locally; the private key never leaves disk.
    let (csr_pem, key_pair) = csr::generate_and_write_csr(&paths.node_csr, &paths.node_key)?;

    // 3. Ask the manager to sign it.
    let client = reqwest::Client::new();
    let url = format!("{}{}", server.trim_end_matches('/'), ROUTE_CA_SIGN);
    let request = SignCertificateRequest {
        node_name: node_name.clone(),
        role: NodeRole::Node,
        csr_pem,
    };

    let resp = client
        .post(&url)
        .header("Authorization", format!("Bearer {}", token))
        .json(&request)
        .send()
        .await;
    let signed: SignCertificateResponse = match resp {
        Ok(resp) if resp.status().is_success() => resp.json().await?,
        Ok(resp) => {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!("Certificate signing failed: {} - {}", status, body);
            return Err(anyhow::anyhow!("certificate signing failed: {}", status));
        }
        Err(e) => {
            error!("Failed to reach server: {}. Is corral-server running?", e);
            return Err(e.into());
        }
    };

    store::write_certificate(&paths.node_cert, signed.certificate_pem.as_bytes())?;

    // 4. Assemble TLS credentials; this also verifies the issued certificate
    // chains to the root we just pinned.
    let _security = SecurityConfig::new(
        Arc::new(root_ca),
        signed.certificate_pem.as_bytes(),
        key_pair.serialize_pem().as_bytes(),
    )?;

    info!(
        "Node {} joined; certificates saved to {}",
        node_name, cert_dir
    );

    Ok(())
}
