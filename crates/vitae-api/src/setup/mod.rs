//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use vitae_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.environment())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        backend = %config.store_backend(),
        "Configuration loaded and validated successfully"
    );

    let media_store = storage::setup_storage(&config).await?;

    let state = Arc::new(AppState::new(config.clone(), media_store));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
