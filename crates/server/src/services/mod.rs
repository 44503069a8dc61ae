//! Business logic services.
//!
//! Handlers stay thin: they validate and shape input/output, and every
//! authorization decision is made here.
//!
//! # Services
//!
//! - `auth` - Signup, login, username changes
//! - `households` - Join codes, membership, nicknames
//! - `pets` - Pets within a household
//! - `entries` - Notes about a pet, editable by their author

pub mod auth;
pub mod entries;
pub mod households;
pub mod pets;

pub use auth::{AuthError, AuthService};
pub use entries::EntryService;
pub use households::{HouseholdService, JoinOutcome, RejoinPolicy};
pub use pets::PetService;

use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::Household;

/// Errors from the household, pet and entry services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Household, pet, entry or membership does not exist.
    #[error("not found")]
    NotFound,

    /// The user is not allowed to touch this resource.
    #[error("forbidden")]
    Forbidden,

    /// Join code is malformed or matches no household.
    #[error("invalid join code")]
    InvalidJoinCode,

    /// The user is already a member of the household.
    #[error("already a member of this household")]
    AlreadyMember(Box<Household>),

    /// Another member of the household uses this nickname.
    #[error("nickname already taken in this household")]
    NicknameTaken,

    /// Every generated join code collided with an existing one.
    #[error("could not allocate a unique join code")]
    JoinCodeExhausted,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    /// Map a repository conflict on a nickname to `NicknameTaken`.
    pub(crate) fn from_nickname(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict(_) => Self::NicknameTaken,
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}
