//! CLI subcommands.

pub mod migrate;
pub mod user;

use recipe_app_api::config::{ApiConfig, ConfigError};
use recipe_app_api::db;
use sqlx::PgPool;

/// Errors shared by every command that talks to the database.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect using the same environment as the API server.
pub async fn connect() -> Result<PgPool, ConnectError> {
    let config = ApiConfig::from_env()?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&config.database_url).await?)
}
