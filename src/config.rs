use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::info;

#[derive(Clone, Default, Debug, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub(crate) api: ApiConfig,
    pub(crate) server: ServerConfig,
    pub(crate) database: DatabaseConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub(crate) struct ApiConfig {
    /// Root of canonical resource URLs.
    pub(crate) base_url: String,
    pub(crate) key_identity: Option<String>,
    pub(crate) key_credential: Option<SecretString>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub(crate) struct ServerConfig {
    pub(crate) http_port: u16,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub(crate) struct DatabaseConfig {
    pub(crate) path: PathBuf,
}

/// Credentials that authorize write requests.
#[derive(Clone, Debug)]
pub(crate) struct ApiKey {
    pub(crate) identity: String,
    pub(crate) credential: SecretString,
}

impl Config {
    /// Read a TOML config file. A missing file yields the defaults.
    pub(crate) fn load(path: &Path) -> Result<Config> {
        if !path.exists() {
            info!(
                target: "lifecycle",
                path = %path.display(),
                "config file not found, using defaults"
            );
            return Ok(Config::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config file {}", path.display()))
    }
}

impl ApiConfig {
    pub(crate) fn api_key(&self) -> Option<ApiKey> {
        Some(ApiKey {
            identity: self.key_identity.clone()?,
            credential: self.key_credential.clone()?,
        })
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            key_identity: None,
            key_credential: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { http_port: 8080 }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("omeka-data"),
        }
    }
}
