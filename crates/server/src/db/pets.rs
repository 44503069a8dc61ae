//! Pet repository for database operations.

use chrono::Utc;
use sqlx::SqlitePool;

use petcare_core::{HouseholdId, PetId};

use super::RepositoryError;
use crate::models::Pet;

/// Repository for pet database operations.
pub struct PetRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PetRepository<'a> {
    /// Create a new pet repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a pet by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: PetId) -> Result<Option<Pet>, RepositoryError> {
        let pet = sqlx::query_as::<_, Pet>(
            r"
            SELECT id, household_id, name, created_at
            FROM pets
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(pet)
    }

    /// List a household's pets ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_household(
        &self,
        household_id: HouseholdId,
    ) -> Result<Vec<Pet>, RepositoryError> {
        let pets = sqlx::query_as::<_, Pet>(
            r"
            SELECT id, household_id, name, created_at
            FROM pets
            WHERE household_id = ?
            ORDER BY name, id
            ",
        )
        .bind(household_id)
        .fetch_all(self.pool)
        .await?;

        Ok(pets)
    }

    /// Create a pet in a household.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including a
    /// foreign key violation for an unknown household).
    pub async fn create(&self, household_id: HouseholdId, name: &str) -> Result<Pet, RepositoryError> {
        let pet = sqlx::query_as::<_, Pet>(
            r"
            INSERT INTO pets (household_id, name, created_at)
            VALUES (?, ?, ?)
            RETURNING id, household_id, name, created_at
            ",
        )
        .bind(household_id)
        .bind(name)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(pet)
    }

    /// Rename a pet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the pet doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn rename(&self, id: PetId, name: &str) -> Result<Pet, RepositoryError> {
        sqlx::query_as::<_, Pet>(
            r"
            UPDATE pets
            SET name = ?
            WHERE id = ?
            RETURNING id, household_id, name, created_at
            ",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a pet. Its entries cascade.
    ///
    /// # Returns
    ///
    /// Returns `true` if the pet was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: PetId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM pets WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
