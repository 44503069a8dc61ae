//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! petcare migrate
//! ```
//!
//! Migrations are embedded from `crates/server/migrations/`.

use super::CommandError;

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the database is
/// unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    super::connect().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
