//! User repository for database operations.

use chrono::Utc;
use sqlx::SqlitePool;

use petcare_core::{UserId, Username};

use super::RepositoryError;
use crate::models::User;

/// User row joined with its password hash, for the login path only.
#[derive(sqlx::FromRow)]
struct UserWithHash {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, username, created_at
            FROM users
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by their username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, username, created_at
            FROM users
            WHERE username = ?
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user together with their password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHash>(
            r"
            SELECT id, username, created_at, password_hash
            FROM users
            WHERE username = ?
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| (r.user, r.password_hash)))
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (username, password_hash, created_at)
            VALUES (?, ?, ?)
            RETURNING id, username, created_at
            ",
        )
        .bind(username)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "username"))
    }

    /// Change a user's username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if another user has the username.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn rename(&self, id: UserId, username: &Username) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            UPDATE users
            SET username = ?
            WHERE id = ?
            RETURNING id, username, created_at
            ",
        )
        .bind(username)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "username"))?
        .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support;

    fn name(s: &str) -> Username {
        Username::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let pool = test_support::pool().await;
        let users = UserRepository::new(&pool);

        let created = users.create(&name("alice"), "hash").await.unwrap();
        let by_name = users.get_by_username(&name("alice")).await.unwrap().unwrap();
        let by_id = users.get_by_id(created.id).await.unwrap().unwrap();

        assert_eq!(by_name.id, created.id);
        assert_eq!(by_id.username.as_str(), "alice");
        assert!(users.get_by_username(&name("bob")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let pool = test_support::pool().await;
        let users = UserRepository::new(&pool);

        users.create(&name("alice"), "hash").await.unwrap();
        let err = users.create(&name("alice"), "other").await.unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_password_hash_lookup() {
        let pool = test_support::pool().await;
        let users = UserRepository::new(&pool);
        users.create(&name("alice"), "$argon2id$stub").await.unwrap();

        let (user, hash) = users
            .get_with_password_hash(&name("alice"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(user.username.as_str(), "alice");
        assert_eq!(hash, "$argon2id$stub");
    }

    #[tokio::test]
    async fn test_rename() {
        let pool = test_support::pool().await;
        let users = UserRepository::new(&pool);
        let alice = users.create(&name("alice"), "hash").await.unwrap();
        users.create(&name("bob"), "hash").await.unwrap();

        let renamed = users.rename(alice.id, &name("alicia")).await.unwrap();
        assert_eq!(renamed.username.as_str(), "alicia");

        let err = users.rename(alice.id, &name("bob")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let err = users.rename(UserId::new(999), &name("ghost")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
