//! Household repository for database operations.

use chrono::Utc;
use sqlx::SqlitePool;

use petcare_core::{HouseholdId, JoinCode, UserId};

use super::RepositoryError;
use crate::models::{Household, Member};

/// Repository for household database operations.
pub struct HouseholdRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> HouseholdRepository<'a> {
    /// Create a new household repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a household by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: HouseholdId) -> Result<Option<Household>, RepositoryError> {
        let household = sqlx::query_as::<_, Household>(
            r"
            SELECT id, name, join_code, created_at
            FROM households
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(household)
    }

    /// Get a household by its join code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_join_code(
        &self,
        code: &JoinCode,
    ) -> Result<Option<Household>, RepositoryError> {
        let household = sqlx::query_as::<_, Household>(
            r"
            SELECT id, name, join_code, created_at
            FROM households
            WHERE join_code = ?
            ",
        )
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        Ok(household)
    }

    /// Create a household and its owner's membership in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the join code is already in use;
    /// nothing is written in that case.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_owner(
        &self,
        name: &str,
        join_code: &JoinCode,
        owner: UserId,
        nickname: &str,
    ) -> Result<(Household, Member), RepositoryError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let household = sqlx::query_as::<_, Household>(
            r"
            INSERT INTO households (name, join_code, created_at)
            VALUES (?, ?, ?)
            RETURNING id, name, join_code, created_at
            ",
        )
        .bind(name)
        .bind(join_code)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "join code"))?;

        let member = sqlx::query_as::<_, Member>(
            r"
            INSERT INTO household_members (user_id, household_id, nickname, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, user_id, household_id, nickname, created_at
            ",
        )
        .bind(owner)
        .bind(household.id)
        .bind(nickname)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((household, member))
    }

    /// Rename a household.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the household doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn rename(&self, id: HouseholdId, name: &str) -> Result<Household, RepositoryError> {
        sqlx::query_as::<_, Household>(
            r"
            UPDATE households
            SET name = ?
            WHERE id = ?
            RETURNING id, name, join_code, created_at
            ",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a household. Pets, entries and memberships cascade.
    ///
    /// # Returns
    ///
    /// Returns `true` if the household was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: HouseholdId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM households WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use petcare_core::Username;

    use super::*;
    use crate::db::{UserRepository, test_support};

    async fn user(pool: &SqlitePool, name: &str) -> UserId {
        UserRepository::new(pool)
            .create(&Username::parse(name).unwrap(), "hash")
            .await
            .unwrap()
            .id
    }

    fn code(s: &str) -> JoinCode {
        JoinCode::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_create_with_owner() {
        let pool = test_support::pool().await;
        let owner = user(&pool, "alice").await;
        let households = HouseholdRepository::new(&pool);

        let (household, member) = households
            .create_with_owner("Casa", &code("ABC234"), owner, "Owner")
            .await
            .unwrap();

        assert_eq!(household.name, "Casa");
        assert_eq!(household.join_code.as_str(), "ABC234");
        assert_eq!(member.household_id, household.id);
        assert_eq!(member.user_id, owner);
        assert_eq!(member.nickname, "Owner");

        let found = households.get_by_join_code(&code("abc234")).await.unwrap();
        assert_eq!(found.unwrap().id, household.id);
    }

    #[tokio::test]
    async fn test_join_code_collision_writes_nothing() {
        let pool = test_support::pool().await;
        let owner = user(&pool, "alice").await;
        let households = HouseholdRepository::new(&pool);

        households
            .create_with_owner("First", &code("ABC234"), owner, "Owner")
            .await
            .unwrap();
        let err = households
            .create_with_owner("Second", &code("ABC234"), owner, "Owner")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM households")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let pool = test_support::pool().await;
        let owner = user(&pool, "alice").await;
        let households = HouseholdRepository::new(&pool);
        let (household, _) = households
            .create_with_owner("Casa", &code("ABC234"), owner, "Owner")
            .await
            .unwrap();

        let renamed = households.rename(household.id, "Home").await.unwrap();
        assert_eq!(renamed.name, "Home");
        assert_eq!(renamed.join_code, household.join_code);

        assert!(households.delete(household.id).await.unwrap());
        assert!(!households.delete(household.id).await.unwrap());
        assert!(households.get_by_id(household.id).await.unwrap().is_none());

        let err = households.rename(household.id, "Gone").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
