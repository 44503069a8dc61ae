//! Pet service. Access to a pet is access to its household.

use sqlx::SqlitePool;

use petcare_core::{HouseholdId, PetId, UserId};

use super::{HouseholdService, ServiceError};
use crate::db::PetRepository;
use crate::models::Pet;

/// Pet service.
pub struct PetService<'a> {
    households: HouseholdService<'a>,
    pets: PetRepository<'a>,
}

impl<'a> PetService<'a> {
    /// Create a new pet service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            households: HouseholdService::new(pool),
            pets: PetRepository::new(pool),
        }
    }

    /// Add a pet to a household the user belongs to.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the household doesn't exist.
    /// Returns `ServiceError::Forbidden` if the user isn't a member.
    pub async fn create(
        &self,
        user_id: UserId,
        household_id: HouseholdId,
        name: &str,
    ) -> Result<Pet, ServiceError> {
        self.households.require_member(user_id, household_id).await?;
        let pet = self.pets.create(household_id, name).await?;

        tracing::info!(pet_id = %pet.id, %household_id, "Pet created");
        Ok(pet)
    }

    /// List a household's pets, ordered by name.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create`].
    pub async fn list(
        &self,
        user_id: UserId,
        household_id: HouseholdId,
    ) -> Result<Vec<Pet>, ServiceError> {
        self.households.require_member(user_id, household_id).await?;
        Ok(self.pets.list_for_household(household_id).await?)
    }

    /// Get a pet whose household the user belongs to.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the pet doesn't exist.
    /// Returns `ServiceError::Forbidden` if the user isn't a member of its household.
    pub async fn get(&self, user_id: UserId, pet_id: PetId) -> Result<Pet, ServiceError> {
        let pet = self
            .pets
            .get_by_id(pet_id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        self.households
            .require_member(user_id, pet.household_id)
            .await?;
        Ok(pet)
    }

    /// Rename a pet.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get`].
    pub async fn rename(
        &self,
        user_id: UserId,
        pet_id: PetId,
        name: &str,
    ) -> Result<Pet, ServiceError> {
        self.get(user_id, pet_id).await?;
        Ok(self.pets.rename(pet_id, name).await?)
    }

    /// Delete a pet and its entries.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get`].
    pub async fn delete(&self, user_id: UserId, pet_id: PetId) -> Result<(), ServiceError> {
        self.get(user_id, pet_id).await?;
        self.pets.delete(pet_id).await?;

        tracing::info!(%pet_id, %user_id, "Pet deleted");
        Ok(())
    }

    /// Delete a pet addressed through its household.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the household doesn't exist or the
    /// pet is not one of its pets.
    /// Returns `ServiceError::Forbidden` if the user isn't a member.
    pub async fn delete_in_household(
        &self,
        user_id: UserId,
        household_id: HouseholdId,
        pet_id: PetId,
    ) -> Result<(), ServiceError> {
        self.households.require_member(user_id, household_id).await?;
        match self.pets.get_by_id(pet_id).await? {
            Some(pet) if pet.household_id == household_id => {}
            _ => return Err(ServiceError::NotFound),
        }
        self.pets.delete(pet_id).await?;

        tracing::info!(%pet_id, %household_id, "Pet deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use petcare_core::Username;

    use super::*;
    use crate::db::{UserRepository, test_support};

    struct Fixture {
        pool: SqlitePool,
        alice: UserId,
        mallory: UserId,
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
        let mallory = users
            .create(&Username::parse("mallory").unwrap(), "hash")
            .await
            .unwrap()
            .id;
        let (household, _) = HouseholdService::new(&pool)
            .create(alice, "Casa", "Owner")
            .await
            .unwrap();

        Fixture {
            pool,
            alice,
            mallory,
            household: household.id,
        }
    }

    #[tokio::test]
    async fn test_members_manage_pets() {
        let f = fixture().await;
        let pets = PetService::new(&f.pool);

        let rex = pets.create(f.alice, f.household, "Rex").await.unwrap();
        pets.create(f.alice, f.household, "Bella").await.unwrap();

        let names: Vec<String> = pets
            .list(f.alice, f.household)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["Bella", "Rex"]);

        let renamed = pets.rename(f.alice, rex.id, "Max").await.unwrap();
        assert_eq!(renamed.name, "Max");

        pets.delete(f.alice, rex.id).await.unwrap();
        assert!(matches!(
            pets.get(f.alice, rex.id).await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_non_members_are_forbidden() {
        let f = fixture().await;
        let pets = PetService::new(&f.pool);
        let rex = pets.create(f.alice, f.household, "Rex").await.unwrap();

        assert!(matches!(
            pets.create(f.mallory, f.household, "Evil").await,
            Err(ServiceError::Forbidden)
        ));
        assert!(matches!(
            pets.list(f.mallory, f.household).await,
            Err(ServiceError::Forbidden)
        ));
        assert!(matches!(
            pets.get(f.mallory, rex.id).await,
            Err(ServiceError::Forbidden)
        ));
        assert!(matches!(
            pets.rename(f.mallory, rex.id, "Mine").await,
            Err(ServiceError::Forbidden)
        ));
        assert!(matches!(
            pets.delete(f.mallory, rex.id).await,
            Err(ServiceError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_delete_in_household_checks_ownership() {
        let f = fixture().await;
        let pets = PetService::new(&f.pool);
        let (other, _) = HouseholdService::new(&f.pool)
            .create(f.alice, "Cabin", "Owner")
            .await
            .unwrap();
        let rex = pets.create(f.alice, f.household, "Rex").await.unwrap();

        assert!(matches!(
            pets.delete_in_household(f.alice, other.id, rex.id).await,
            Err(ServiceError::NotFound)
        ));
        pets.delete_in_household(f.alice, f.household, rex.id)
            .await
            .unwrap();
        assert!(pets.list(f.alice, f.household).await.unwrap().is_empty());
    }
}
