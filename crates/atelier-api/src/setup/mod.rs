//! Application setup: database, storage, state and routes.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use atelier_core::Config;
use atelier_db::{ArtworkRepository, EngagementRepository};

use crate::state::AppState;

/// Build the state and router for a production run.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;
    tracing::info!(environment = %config.environment(), "Configuration loaded and validated");

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;

    let state = Arc::new(
        AppState::new(
            config.clone(),
            Arc::new(ArtworkRepository::new(pool.clone())),
            Arc::new(EngagementRepository::new(pool.clone())),
            storage,
        )
        .with_pool(pool),
    );

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
