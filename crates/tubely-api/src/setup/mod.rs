//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::{InMemoryVideoRepository, PgVideoRepository, VideoRepository};

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.log_format())
        .context("Failed to initialize telemetry")?;

    tracing::info!(
        environment = %config.environment(),
        storage_backend = %config.storage_backend(),
        thumbnail_strategy = %config.thumbnail_strategy(),
        video_strategy = %config.video_strategy(),
        "Configuration loaded and validated successfully"
    );

    let repository: Arc<dyn VideoRepository> = match config.database_url() {
        Some(_) => {
            let pool = database::setup_database(&config).await?;
            Arc::new(PgVideoRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; video records are kept in memory");
            Arc::new(InMemoryVideoRepository::new())
        }
    };

    let storage = tubely_storage::create_storage(&config)
        .await
        .context("Failed to initialize object storage")?;

    let state = services::initialize_services(&config, repository, storage).await?;
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
