use serde::{Deserialize, Serialize};

/// Server configuration file (YAML).
///
/// Example `config.yaml`:
/// ```yaml
/// port: 6443
/// cert-dir: /var/lib/corral/certs
/// cluster-name: corral
/// token: my-secret-token
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfigFile {
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default, alias = "cert-dir")]
    pub cert_dir: Option<String>,
    #[serde(default, alias = "cluster-name")]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Agent configuration file (YAML).
///
/// Example `agent-config.yaml`:
/// ```yaml
/// server: http://10.0.0.1:6443
/// token: my-secret-token
/// node-name: worker-1
/// ca-fingerprint: 9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfigFile {
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, alias = "node-name")]
    pub node_name: Option<String>,
    #[serde(default, alias = "ca-fingerprint")]
    pub ca_fingerprint: Option<String>,
    #[serde(default, alias = "cert-dir")]
    pub cert_dir: Option<String>,
}

/// Load a YAML config file, returning the default if the file doesn't exist.
pub fn load_config_file<T: serde::de::DeserializeOwned + Default>(path: &str) -> anyhow::Result<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(T::default());
        }
        Err(e) => return Err(e.into()),
    };
    let config: T = serde_yaml::from_str(&content)?;
    Ok(config)
}
