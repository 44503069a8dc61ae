//! Seed the database with a demo household.
//!
//! Creates two users (`alice` and `bob`), a shared household, two pets and a
//! week of back-dated entries so the range filters on the pet page have
//! something to show.

use chrono::{Duration, Utc};

use sqlx::SqlitePool;

use petcare_core::Username;
use petcare_server::db::{EntryRepository, UserRepository};
use petcare_server::services::{AuthService, HouseholdService, PetService, RejoinPolicy};

use super::CommandError;

/// Demo accounts, in author-index order.
const USERS: [&str; 2] = ["alice", "bob"];

/// Entries per pet as `(hours ago, author index, text)`.
const ENTRIES: [(i64, usize, &str); 6] = [
    (1, 0, "Breakfast, full bowl"),
    (5, 1, "Long walk in the park"),
    (26, 0, "Brushed and nails trimmed"),
    (50, 1, "Vet check-up, all good"),
    (100, 0, "New toy, ignored it"),
    (24 * 20, 1, "Started the new food"),
];

/// Insert the demo data into the configured database.
///
/// # Errors
///
/// Returns `CommandError::AlreadySeeded` if a demo user already exists, or
/// an error if a database operation fails.
pub async fn run(password: &str) -> Result<(), CommandError> {
    let pool = super::connect().await?;
    seed(&pool, password).await
}

/// Fail before writing anything if a demo account is already taken.
async fn ensure_fresh(pool: &SqlitePool) -> Result<(), CommandError> {
    let users = UserRepository::new(pool);
    for name in USERS {
        let Ok(username) = Username::parse(name) else {
            continue;
        };
        if users.get_by_username(&username).await?.is_some() {
            return Err(CommandError::AlreadySeeded(name.to_string()));
        }
    }
    Ok(())
}

async fn seed(pool: &SqlitePool, password: &str) -> Result<(), CommandError> {
    ensure_fresh(pool).await?;

    let [alice, bob] = USERS;
    let auth = AuthService::new(pool);
    let alice = auth.signup(alice, password).await?;
    let bob = auth.signup(bob, password).await?;
    let authors = [alice.id, bob.id];

    let households = HouseholdService::new(pool);
    let (household, _) = households.create(alice.id, "The Burrow", "Alice").await?;
    households
        .join(
            bob.id,
            household.join_code.as_str(),
            "Bob",
            RejoinPolicy::Reject,
        )
        .await?;

    let pets = PetService::new(pool);
    let entries = EntryRepository::new(pool);
    let now = Utc::now();
    for name in ["Biscuit", "Pepper"] {
        let pet = pets.create(alice.id, household.id, name).await?;
        for (hours_ago, author, text) in ENTRIES {
            let author = authors.get(author).copied().unwrap_or(alice.id);
            entries
                .create_at(pet.id, author, text, now - Duration::hours(hours_ago))
                .await?;
        }
    }

    tracing::info!(
        household_id = %household.id,
        join_code = %household.join_code,
        "Seeded demo household; log in as alice or bob"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use petcare_server::db;

    async fn pool() -> SqlitePool {
        let pool = db::create_pool(&SecretString::from("sqlite::memory:"))
            .await
            .unwrap();
        db::run_migrations(&pool).await.unwrap();
        pool
    }

    async fn count(pool: &SqlitePool, table: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap();
        count
    }

    #[tokio::test]
    async fn test_seed_creates_demo_household() {
        let pool = pool().await;

        seed(&pool, "petcare").await.unwrap();

        assert_eq!(count(&pool, "users").await, 2);
        assert_eq!(count(&pool, "households").await, 1);
        assert_eq!(count(&pool, "household_members").await, 2);
        assert_eq!(count(&pool, "pets").await, 2);
        assert_eq!(count(&pool, "entries").await, 12);
    }

    #[tokio::test]
    async fn test_existing_user_aborts_before_writing() {
        let pool = pool().await;
        AuthService::new(&pool).signup("bob", "secret").await.unwrap();

        let err = seed(&pool, "petcare").await.unwrap_err();

        assert!(matches!(err, CommandError::AlreadySeeded(name) if name == "bob"));
        assert_eq!(count(&pool, "users").await, 1);
        assert_eq!(count(&pool, "households").await, 0);
    }
}
