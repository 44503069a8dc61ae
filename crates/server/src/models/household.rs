//! Household and membership domain types.

use chrono::{DateTime, Utc};

use petcare_core::{HouseholdId, JoinCode, MemberId, UserId};

/// A household: the tenant that owns pets and memberships.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Household {
    /// Unique household ID.
    pub id: HouseholdId,
    /// Display name.
    pub name: String,
    /// Code other users enter to join.
    pub join_code: JoinCode,
    /// When the household was created.
    pub created_at: DateTime<Utc>,
}

/// A user's membership in a household.
///
/// Unique per `(user_id, household_id)`; the nickname is unique per household.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Member {
    pub id: MemberId,
    pub user_id: UserId,
    pub household_id: HouseholdId,
    pub nickname: String,
    pub created_at: DateTime<Utc>,
}

/// One of the current user's memberships, joined with its household.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Membership {
    pub member_id: MemberId,
    pub household_id: HouseholdId,
    pub household_name: String,
    pub join_code: JoinCode,
    pub nickname: String,
}

/// A member of a household, joined with the member's user account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MemberProfile {
    pub member_id: MemberId,
    pub user_id: UserId,
    pub username: String,
    pub nickname: String,
}
