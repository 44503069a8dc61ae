//! Household membership repository.

use chrono::Utc;
use sqlx::SqlitePool;

use petcare_core::{HouseholdId, MemberId, UserId};

use super::RepositoryError;
use crate::models::{Member, MemberProfile, Membership};

/// Repository for `household_members` rows.
pub struct MemberRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MemberRepository<'a> {
    /// Create a new member repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user's membership in a household.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        user_id: UserId,
        household_id: HouseholdId,
    ) -> Result<Option<Member>, RepositoryError> {
        let member = sqlx::query_as::<_, Member>(
            r"
            SELECT id, user_id, household_id, nickname, created_at
            FROM household_members
            WHERE user_id = ? AND household_id = ?
            ",
        )
        .bind(user_id)
        .bind(household_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(member)
    }

    /// Add a user to a household.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DuplicateMembership` if the user is already a member.
    /// Returns `RepositoryError::Conflict` if the nickname is taken in this household.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        household_id: HouseholdId,
        nickname: &str,
    ) -> Result<Member, RepositoryError> {
        sqlx::query_as::<_, Member>(
            r"
            INSERT INTO household_members (user_id, household_id, nickname, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, user_id, household_id, nickname, created_at
            ",
        )
        .bind(user_id)
        .bind(household_id)
        .bind(nickname)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(member_conflict)
    }

    /// Change a member's nickname.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the membership doesn't exist.
    /// Returns `RepositoryError::Conflict` if the nickname is taken in this household.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_nickname(
        &self,
        id: MemberId,
        nickname: &str,
    ) -> Result<Member, RepositoryError> {
        sqlx::query_as::<_, Member>(
            r"
            UPDATE household_members
            SET nickname = ?
            WHERE id = ?
            RETURNING id, user_id, household_id, nickname, created_at
            ",
        )
        .bind(nickname)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "nickname"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Remove a user from a household.
    ///
    /// # Returns
    ///
    /// Returns `true` if a membership was deleted, `false` if there was none.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(
        &self,
        user_id: UserId,
        household_id: HouseholdId,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM household_members WHERE user_id = ? AND household_id = ?")
                .bind(user_id)
                .bind(household_id)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List a user's memberships, ordered by household name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Membership>, RepositoryError> {
        let memberships = sqlx::query_as::<_, Membership>(
            r"
            SELECT m.id AS member_id,
                   h.id AS household_id,
                   h.name AS household_name,
                   h.join_code,
                   m.nickname
            FROM household_members m
            JOIN households h ON h.id = m.household_id
            WHERE m.user_id = ?
            ORDER BY h.name, h.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(memberships)
    }

    /// List the members of a household, ordered by nickname.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_household(
        &self,
        household_id: HouseholdId,
    ) -> Result<Vec<MemberProfile>, RepositoryError> {
        let members = sqlx::query_as::<_, MemberProfile>(
            r"
            SELECT m.id AS member_id,
                   u.id AS user_id,
                   u.username,
                   m.nickname
            FROM household_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.household_id = ?
            ORDER BY m.nickname, m.id
            ",
        )
        .bind(household_id)
        .fetch_all(self.pool)
        .await?;

        Ok(members)
    }
}

/// Tell the two unique constraints on `household_members` apart.
///
/// SQLite names the violated columns in the message, e.g.
/// `UNIQUE constraint failed: household_members.household_id, household_members.nickname`.
fn member_conflict(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
        && !db_err.message().contains(".nickname")
    {
        return RepositoryError::DuplicateMembership;
    }
    RepositoryError::from_unique(e, "nickname")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use petcare_core::{JoinCode, Username};

    use super::*;
    use crate::db::{HouseholdRepository, UserRepository, test_support};

    struct Fixture {
        pool: SqlitePool,
        alice: UserId,
        bob: UserId,
        household: HouseholdId,
    }

    async fn fixture() -> Fixture {
        let pool = test_support::pool().await;
        let users = UserRepository::new(&pool);
        let alice = users
            .create(&Username::parse("alice").unwrap(), "hash")
            .await
            .unwrap()
            .id;
        let bob = users
            .create(&Username::parse("bob").unwrap(), "hash")
            .await
            .unwrap()
            .id;
        let (household, _) = HouseholdRepository::new(&pool)
            .create_with_owner("Casa", &JoinCode::parse("ABC234").unwrap(), alice, "Al")
            .await
            .unwrap();

        Fixture {
            pool,
            alice,
            bob,
            household: household.id,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let f = fixture().await;
        let members = MemberRepository::new(&f.pool);

        assert!(members.get(f.bob, f.household).await.unwrap().is_none());
        let bob = members.create(f.bob, f.household, "Bobby").await.unwrap();
        let found = members.get(f.bob, f.household).await.unwrap().unwrap();

        assert_eq!(found.id, bob.id);
        assert_eq!(found.nickname, "Bobby");
    }

    #[tokio::test]
    async fn test_nickname_unique_per_household() {
        let f = fixture().await;
        let members = MemberRepository::new(&f.pool);

        let err = members.create(f.bob, f.household, "Al").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let bob = members.create(f.bob, f.household, "Bobby").await.unwrap();
        let err = members.update_nickname(bob.id, "Al").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let updated = members.update_nickname(bob.id, "Rob").await.unwrap();
        assert_eq!(updated.nickname, "Rob");
    }

    #[tokio::test]
    async fn test_user_joins_household_once() {
        let f = fixture().await;
        let members = MemberRepository::new(&f.pool);

        let err = members.create(f.alice, f.household, "Again").await.unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateMembership));
    }

    #[tokio::test]
    async fn test_listings() {
        let f = fixture().await;
        let members = MemberRepository::new(&f.pool);
        members.create(f.bob, f.household, "Bobby").await.unwrap();

        let profiles = members.list_for_household(f.household).await.unwrap();
        let nicknames: Vec<&str> = profiles.iter().map(|p| p.nickname.as_str()).collect();
        assert_eq!(nicknames, ["Al", "Bobby"]);
        assert_eq!(profiles[1].username, "bob");

        let memberships = members.list_for_user(f.bob).await.unwrap();
        assert_eq!(memberships.len(), 1);
        assert_eq!(memberships[0].household_name, "Casa");
        assert_eq!(memberships[0].join_code.as_str(), "ABC234");
    }

    #[tokio::test]
    async fn test_delete() {
        let f = fixture().await;
        let members = MemberRepository::new(&f.pool);

        assert!(members.delete(f.alice, f.household).await.unwrap());
        assert!(!members.delete(f.alice, f.household).await.unwrap());
        assert!(members.list_for_user(f.alice).await.unwrap().is_empty());
    }
}
