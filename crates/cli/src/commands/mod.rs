//! CLI subcommands.

pub mod migrate;
pub mod seed;
pub mod user;

use sqlx::SqlitePool;
use thiserror::Error;

use petcare_server::config::{ConfigError, PetcareConfig};
use petcare_server::db::{self, RepositoryError};
use petcare_server::services::{AuthError, ServiceError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("User '{0}' already exists; the demo data was not seeded")]
    AlreadySeeded(String),
}

/// Connect to the configured database and bring its schema up to date.
async fn connect() -> Result<SqlitePool, CommandError> {
    let config = PetcareConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    Ok(pool)
}
