//! CLI command implementations

pub mod account;
pub mod plan;
pub mod tick;

use anyhow::{Context, Result};
use std::sync::Arc;

use grid_ladder::bitunix::{BitunixClient, Credentials};
use grid_ladder::config::{AppPaths, GridConfig};
use grid_ladder::session::{Session, VerifiedSession};
use grid_ladder::store::ConfigStore;

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")
}

/// Create the app directory and load (or initialise) the config
fn load_config(paths: &AppPaths) -> Result<GridConfig> {
    paths.ensure()?;
    let store = ConfigStore::new(paths.config());
    store
        .load_or_init()
        .with_context(|| format!("Failed to load config from {}", store.path().display()))
}

/// Resolve credentials and verify them against the exchange
async fn connect(paths: &AppPaths, config: &GridConfig) -> Result<VerifiedSession> {
    let credentials = Credentials::resolve(&paths.secrets()).with_context(|| {
        format!(
            "Set BITUNIX_API_KEY / BITUNIX_API_SECRET or fill {}",
            paths.secrets().display()
        )
    })?;
    let client = BitunixClient::new(credentials)?;

    Session::new(Arc::new(client))
        .verify(&config.symbol)
        .await
        .context("API connection failed")
}
