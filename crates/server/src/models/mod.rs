//! Domain models for PetCare.
//!
//! Rows decode directly into these types via `sqlx::FromRow`; the typed ids
//! and validated strings from `petcare-core` carry their own sqlx impls.

pub mod entry;
pub mod household;
pub mod pet;
pub mod session;
pub mod user;

pub use entry::{Entry, EntryRange};
pub use household::{Household, Member, MemberProfile, Membership};
pub use pet::Pet;
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
