//! Pet domain types.

use chrono::{DateTime, Utc};

use petcare_core::{HouseholdId, PetId};

/// A pet belonging to exactly one household.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Pet {
    pub id: PetId,
    pub household_id: HouseholdId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
