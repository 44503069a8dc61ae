//! Database operations for the PetCare SQLite database.
//!
//! ## Tables
//!
//! - `users` - Login accounts
//! - `households` - Tenants, each with a unique join code
//! - `household_members` - User membership and per-household nickname
//! - `pets` - Pets owned by a household
//! - `entries` - Free-text notes about a pet
//! - `tower_sessions` - Session storage (created by the session store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and embedded into the
//! binary. They run at startup unless `PETCARE_RUN_MIGRATIONS=false`, or
//! explicitly via:
//! ```bash
//! cargo run -p petcare-cli -- migrate
//! ```

pub mod entries;
pub mod households;
pub mod members;
pub mod pets;
pub mod users;

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub use entries::EntryRepository;
pub use households::HouseholdRepository;
pub use members::MemberRepository;
pub use pets::PetRepository;
pub use users::UserRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The user already has a membership row for this household.
    #[error("membership already exists")]
    DuplicateMembership,
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
    pub(crate) fn from_unique(e: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(e)
    }
}

/// Whether a connection string names an in-memory database.
fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Create a SQLite connection pool.
///
/// Foreign keys are enforced on every connection and the database file (and
/// its parent directory) is created if missing. In-memory databases get a
/// single long-lived connection so every handler sees the same data.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(database_url: &SecretString) -> Result<SqlitePool, sqlx::Error> {
    let url = database_url.expose_secret();
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    if is_in_memory(url) {
        return SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await;
    }

    if let Some(parent) = options.get_filename().parent()
        && !parent.as_os_str().is_empty()
    {
        create_parent_dir(parent).await?;
    }

    SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options.journal_mode(SqliteJournalMode::Wal))
        .await
}

async fn create_parent_dir(dir: &Path) -> Result<(), sqlx::Error> {
    tokio::fs::create_dir_all(dir).await.map_err(sqlx::Error::Io)
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the recorded history does
/// not match the embedded migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for repository and service tests.

    use sqlx::SqlitePool;

    use super::{create_pool, run_migrations};

    /// Fresh, migrated in-memory database.
    #[allow(clippy::unwrap_used)]
    pub async fn pool() -> SqlitePool {
        let url = secrecy::SecretString::from("sqlite::memory:");
        let pool = create_pool(&url).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_in_memory() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:petcare?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://instance/petcare.db"));
    }

    #[tokio::test]
    async fn test_migrations_create_schema() {
        let pool = test_support::pool().await;

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '\\_%' ESCAPE '\\' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();

        for expected in ["entries", "household_members", "households", "pets", "users"] {
            assert!(names.contains(&expected), "missing table {expected}");
        }
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let pool = test_support::pool().await;

        let result = sqlx::query(
            "INSERT INTO pets (household_id, name, created_at) VALUES (999, 'Ghost', '2025-01-01T00:00:00+00:00')",
        )
        .execute(&pool)
        .await;

        assert!(result.is_err());
    }
}
