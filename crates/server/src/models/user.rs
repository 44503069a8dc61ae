//! User domain types.

use chrono::{DateTime, Utc};

use petcare_core::{UserId, Username};

/// A registered user.
///
/// The password hash is deliberately not part of this type; it is only read
/// by the login path (see `UserRepository::get_with_password_hash`).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique login name.
    pub username: Username,
    /// When the user signed up.
    pub created_at: DateTime<Utc>,
}
