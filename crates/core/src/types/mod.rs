//! Core types for PetCare.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod join_code;
pub mod username;

pub use id::*;
pub use join_code::{JoinCode, JoinCodeError};
pub use username::{Username, UsernameError};
