//! Entry repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use petcare_core::{EntryId, PetId, UserId};

use super::RepositoryError;
use crate::models::Entry;

/// Repository for entry database operations.
pub struct EntryRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> EntryRepository<'a> {
    /// Create a new entry repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get an entry by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: EntryId) -> Result<Option<Entry>, RepositoryError> {
        let entry = sqlx::query_as::<_, Entry>(
            r"
            SELECT id, pet_id, user_id, content, created_at
            FROM entries
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(entry)
    }

    /// List a pet's entries, newest first.
    ///
    /// When `since` is given only entries created at or after it are returned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_pet(
        &self,
        pet_id: PetId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Entry>, RepositoryError> {
        let entries = sqlx::query_as::<_, Entry>(
            r"
            SELECT id, pet_id, user_id, content, created_at
            FROM entries
            WHERE pet_id = ?1 AND (?2 IS NULL OR created_at >= ?2)
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(pet_id)
        .bind(since)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }

    /// Create an entry stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        pet_id: PetId,
        user_id: UserId,
        content: &str,
    ) -> Result<Entry, RepositoryError> {
        self.create_at(pet_id, user_id, content, Utc::now()).await
    }

    /// Create an entry with an explicit timestamp.
    ///
    /// Used for importing history and seeding demo data.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_at(
        &self,
        pet_id: PetId,
        user_id: UserId,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Entry, RepositoryError> {
        let entry = sqlx::query_as::<_, Entry>(
            r"
            INSERT INTO entries (pet_id, user_id, content, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, pet_id, user_id, content, created_at
            ",
        )
        .bind(pet_id)
        .bind(user_id)
        .bind(content)
        .bind(created_at)
        .fetch_one(self.pool)
        .await?;

        Ok(entry)
    }

    /// Replace an entry's content.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_content(&self, id: EntryId, content: &str) -> Result<Entry, RepositoryError> {
        sqlx::query_as::<_, Entry>(
            r"
            UPDATE entries
            SET content = ?
            WHERE id = ?
            RETURNING id, pet_id, user_id, content, created_at
            ",
        )
        .bind(content)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete an entry.
    ///
    /// # Returns
    ///
    /// Returns `true` if the entry was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: EntryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};
    use petcare_core::{JoinCode, Username};

    use super::*;
    use crate::db::{HouseholdRepository, PetRepository, UserRepository, test_support};

    async fn pet_and_author(pool: &SqlitePool) -> (PetId, UserId) {
        let author = UserRepository::new(pool)
            .create(&Username::parse("alice").unwrap(), "hash")
            .await
            .unwrap();
        let (household, _) = HouseholdRepository::new(pool)
            .create_with_owner("Casa", &JoinCode::parse("ABC234").unwrap(), author.id, "Al")
            .await
            .unwrap();
        let pet = PetRepository::new(pool)
            .create(household.id, "Rex")
            .await
            .unwrap();
        (pet.id, author.id)
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let pool = test_support::pool().await;
        let (pet, author) = pet_and_author(&pool).await;
        let entries = EntryRepository::new(&pool);
        let base = Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap();

        entries.create_at(pet, author, "fed", base).await.unwrap();
        entries
            .create_at(pet, author, "walked", base + Duration::hours(2))
            .await
            .unwrap();
        entries
            .create_at(pet, author, "vet", base + Duration::minutes(30))
            .await
            .unwrap();

        let contents: Vec<String> = entries
            .list_for_pet(pet, None)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.content)
            .collect();
        assert_eq!(contents, ["walked", "vet", "fed"]);
    }

    #[tokio::test]
    async fn test_list_since_is_inclusive() {
        let pool = test_support::pool().await;
        let (pet, author) = pet_and_author(&pool).await;
        let entries = EntryRepository::new(&pool);
        let midnight = Utc.with_ymd_and_hms(2025, 5, 2, 0, 0, 0).unwrap();

        entries
            .create_at(pet, author, "yesterday", midnight - Duration::seconds(1))
            .await
            .unwrap();
        entries.create_at(pet, author, "midnight", midnight).await.unwrap();
        entries
            .create_at(pet, author, "morning", midnight + Duration::hours(7))
            .await
            .unwrap();

        let contents: Vec<String> = entries
            .list_for_pet(pet, Some(midnight))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.content)
            .collect();
        assert_eq!(contents, ["morning", "midnight"]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let pool = test_support::pool().await;
        let (pet, author) = pet_and_author(&pool).await;
        let entries = EntryRepository::new(&pool);
        let entry = entries.create(pet, author, "fed").await.unwrap();

        let updated = entries.update_content(entry.id, "fed twice").await.unwrap();
        assert_eq!(updated.content, "fed twice");
        assert_eq!(updated.created_at, entry.created_at);

        assert!(entries.delete(entry.id).await.unwrap());
        assert!(entries.get_by_id(entry.id).await.unwrap().is_none());
        assert!(!entries.delete(entry.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_pet_delete_cascades() {
        let pool = test_support::pool().await;
        let (pet, author) = pet_and_author(&pool).await;
        let entries = EntryRepository::new(&pool);
        let entry = entries.create(pet, author, "fed").await.unwrap();

        PetRepository::new(&pool).delete(pet).await.unwrap();

        assert!(entries.get_by_id(entry.id).await.unwrap().is_none());
    }
}
