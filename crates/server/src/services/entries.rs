//! Entry service.
//!
//! Creating and reading entries only requires the pet to exist; editing and
//! deleting are restricted to the entry's author.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use petcare_core::{EntryId, PetId, UserId};

use super::ServiceError;
use crate::db::{EntryRepository, PetRepository, RepositoryError};
use crate::models::{Entry, Pet};

/// Entry service.
pub struct EntryService<'a> {
    pets: PetRepository<'a>,
    entries: EntryRepository<'a>,
}

impl<'a> EntryService<'a> {
    /// Create a new entry service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pets: PetRepository::new(pool),
            entries: EntryRepository::new(pool),
        }
    }

    /// Load the pet entries are attached to.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the pet doesn't exist.
    pub async fn require_pet(&self, pet_id: PetId) -> Result<Pet, ServiceError> {
        self.pets
            .get_by_id(pet_id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    /// Add an entry to a pet loaded with [`Self::require_pet`].
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the insert fails (e.g. the pet
    /// was deleted in the meantime).
    pub async fn create(&self, user_id: UserId, pet: &Pet, content: &str) -> Result<Entry, ServiceError> {
        let entry = self.entries.create(pet.id, user_id, content).await?;

        tracing::debug!(entry_id = %entry.id, pet_id = %pet.id, "Entry created");
        Ok(entry)
    }

    /// List a pet's entries newest first, optionally from `since` onwards.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the pet doesn't exist.
    pub async fn list(
        &self,
        pet_id: PetId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Entry>, ServiceError> {
        self.require_pet(pet_id).await?;
        Ok(self.entries.list_for_pet(pet_id, since).await?)
    }

    /// Get an entry.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the entry doesn't exist.
    pub async fn get(&self, entry_id: EntryId) -> Result<Entry, ServiceError> {
        self.entries
            .get_by_id(entry_id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    /// Get an entry that must belong to `pet_id`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the entry doesn't exist or is
    /// attached to another pet.
    pub async fn get_in_pet(&self, pet_id: PetId, entry_id: EntryId) -> Result<Entry, ServiceError> {
        let entry = self.get(entry_id).await?;
        if entry.pet_id != pet_id {
            return Err(ServiceError::NotFound);
        }
        Ok(entry)
    }

    /// Check that `user_id` wrote `entry`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` for anyone but the author.
    pub fn ensure_author(user_id: UserId, entry: &Entry) -> Result<(), ServiceError> {
        if entry.user_id == user_id {
            Ok(())
        } else {
            Err(ServiceError::Forbidden)
        }
    }

    /// Replace the content of an entry loaded with [`Self::get`].
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` if the user isn't the author.
    /// Returns `ServiceError::NotFound` if the entry has since been deleted.
    pub async fn update(
        &self,
        user_id: UserId,
        entry: &Entry,
        content: &str,
    ) -> Result<Entry, ServiceError> {
        Self::ensure_author(user_id, entry)?;
        match self.entries.update_content(entry.id, content).await {
            Ok(updated) => Ok(updated),
            Err(RepositoryError::NotFound) => Err(ServiceError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete an entry loaded with [`Self::get`].
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` if the user isn't the author.
    pub async fn delete(&self, user_id: UserId, entry: &Entry) -> Result<(), ServiceError> {
        Self::ensure_author(user_id, entry)?;
        self.entries.delete(entry.id).await?;

        tracing::debug!(entry_id = %entry.id, "Entry deleted");
        Ok(())
    }
}
