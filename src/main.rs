mod api;
mod config;
mod http;
mod json_ld;
mod repo;

use std::path::PathBuf;

use anyhow::{Context, Result};
use fjall::PersistMode;
use tokio::signal::unix::{SignalKind, signal};
use tracing::info;

use crate::api::{ApiRouter, default_adapters};
use crate::config::Config;
use crate::http::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let flags = xflags::parse_or_exit! {
        /// Path to the TOML configuration file
        optional -c,--config CONFIG: PathBuf
    };
    let config_path = flags
        .config
        .unwrap_or_else(|| PathBuf::from("omeka-api.toml"));
    let config = Config::load(&config_path)?;

    let router = ApiRouter::new(&config.api.base_url)?;
    let keyspace = fjall::Config::new(&config.database.path)
        .open()
        .with_context(|| format!("unable to open {}", config.database.path.display()))?;
    let adapters = default_adapters(&keyspace)?;
    info!(
        target: "lifecycle",
        base_url = %config.api.base_url,
        resources = ?adapters.resource_names().collect::<Vec<_>>(),
        "started"
    );

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let shutdown = async move {
        tokio::select! {
            _ = sigterm.recv() => {
                info!(target: "lifecycle", "Received the terminate signal; stopping");
            }
            _ = sigint.recv() => {
                info!(target: "lifecycle", "Received the interrupt signal; stopping");
            }
        }
    };

    let app = http::app(AppState::new(adapters, router), config.api.api_key());
    http::serve(config.server.http_port, app, shutdown).await?;

    keyspace.persist(PersistMode::SyncAll)?;
    info!(target: "lifecycle", "stopped");
    Ok(())
}
