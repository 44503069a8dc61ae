//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username is blank or too long.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] petcare_core::UsernameError),

    /// Password was empty.
    #[error("password is required")]
    EmptyPassword,

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Another account already has this username.
    #[error("username already taken")]
    UsernameTaken,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Map a repository conflict to `UsernameTaken`.
    pub(crate) fn from_repository(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict(_) => Self::UsernameTaken,
            RepositoryError::NotFound => Self::UserNotFound,
            other => Self::Repository(other),
        }
    }
}
