use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use pkg_api::server::{CaServerConfig, start_server};
use pkg_constants::network::DEFAULT_API_PORT;
use pkg_constants::paths::{DEFAULT_SERVER_CERT_DIR, DEFAULT_SERVER_CONFIG};
use pkg_pki::paths::CertificatePaths;
use pkg_pki::{RootCa, SecurityConfig, sign, store};
use pkg_types::ca::NodeRole;
use pkg_types::config::{ServerConfigFile, load_config_file};

#[derive(Parser, Debug)]
#[command(name = "corral-server", about = "corral cluster CA server")]
struct Cli {
    /// Path to YAML config file
    #[arg(long, short, default_value = DEFAULT_SERVER_CONFIG)]
    config: String,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Directory for the root CA and manager certificates
    #[arg(long)]
    cert_dir: Option<String>,

    /// Cluster name, used as the root CA subject CN
    #[arg(long)]
    cluster_name: Option<String>,

    /// Join token agents must present for signing requests
    #[arg(long)]
    token: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    // Load config file (returns defaults if file not found)
    let file_cfg: ServerConfigFile = load_config_file(&cli.config)?;
    info!("Config file: {}", cli.config);

    // Merge: CLI args > config file > defaults
    let port = cli.port.or(file_cfg.port).unwrap_or(DEFAULT_API_PORT);
    let cert_dir = cli
        .cert_dir
        .or(file_cfg.cert_dir)
        .unwrap_or_else(|| DEFAULT_SERVER_CERT_DIR.to_string());
    let cluster_name = cli
        .cluster_name
        .or(file_cfg.cluster_name)
        .unwrap_or_else(|| "corral".to_string());
    let token = cli
        .token
        .or(file_cfg.token)
        .unwrap_or_else(|| "demo-token-123".to_string());

    info!("Starting corral-server");
    info!("  Port:      {}", port);
    info!("  Cert dir:  {}", cert_dir);
    info!("  Cluster:   {}", cluster_name);
    info!("  Token:     {}***", token_preview(&token));

    std::fs::create_dir_all(&cert_dir)?;
    let paths = CertificatePaths::new(Path::new(&cert_dir));

    let root_ca = init_root_ca(&paths, &cluster_name)?;
    // Hand this to joining nodes together with the join token.
    info!("Root CA fingerprint: {}", root_ca.fingerprint());
    let root_ca = Arc::new(root_ca);

    let security = Arc::new(init_manager_identity(&root_ca, &paths)?);

    let config = CaServerConfig {
        addr: SocketAddr::from(([0, 0, 0, 0], port)),
        join_token: token,
    };
    start_server(config, security).await?;

    Ok(())
}

/// First few characters of the join token, for log output only.
fn token_preview(token: &str) -> String {
    token.chars().take(4).collect()
}

/// Create the cluster root CA on first boot, or reload it from disk.
fn init_root_ca(paths: &CertificatePaths, cluster_name: &str) -> anyhow::Result<RootCa> {
    if paths.root_ca_cert.exists() && paths.root_ca_key.exists() {
        info!("Loading existing root CA from {}", paths.root_ca_cert.display());
        Ok(RootCa::load(&paths.root_ca_cert, &paths.root_ca_key)?)
    } else {
        Ok(RootCa::create(
            &paths.root_ca_cert,
            &paths.root_ca_key,
            cluster_name,
        )?)
    }
}

/// Issue (or reload) the manager's own TLS identity and assemble the shared
/// TLS credentials from it.
fn init_manager_identity(
    root_ca: &Arc<RootCa>,
    paths: &CertificatePaths,
) -> anyhow::Result<SecurityConfig> {
    let (cert_pem, key_pem) = if paths.node_cert.exists() && paths.node_key.exists() {
        info!("Loading existing manager certificate");
        (
            store::read_pem(&paths.node_cert)?,
            store::read_pem(&paths.node_key)?,
        )
    } else {
        info!("Issuing manager TLS certificate");
        let (cert_pem, key_pair) = sign::generate_and_sign_new_tls_cert(
            root_ca,
            &paths.node_cert,
            &paths.node_key,
            "manager",
            NodeRole::Manager.organizational_unit(),
        )?;
        (cert_pem.into_bytes(), key_pair.serialize_pem().into_bytes())
    };

    Ok(SecurityConfig::new(root_ca.clone(), &cert_pem, &key_pem)?)
}
