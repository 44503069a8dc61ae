//! Household service: creation with join-code allocation, joining,
//! leaving and membership checks.

use sqlx::SqlitePool;

use petcare_core::{HouseholdId, JoinCode, UserId};

use super::ServiceError;
use crate::db::{HouseholdRepository, MemberRepository, RepositoryError};
use crate::error::add_breadcrumb;
use crate::models::{Household, Member, MemberProfile, Membership};

/// Upper bound on join-code generation attempts for one household.
pub const MAX_JOIN_CODE_ATTEMPTS: usize = 16;

/// What `join` does when the user already belongs to the household.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejoinPolicy {
    /// Treat the join as idempotent and update the nickname.
    UpdateNickname,
    /// Fail with `ServiceError::AlreadyMember`.
    Reject,
}

/// Result of a successful join.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub household: Household,
    pub member: Member,
    /// `false` when an existing membership was reused.
    pub created: bool,
}

/// Household service.
pub struct HouseholdService<'a> {
    households: HouseholdRepository<'a>,
    members: MemberRepository<'a>,
}

impl<'a> HouseholdService<'a> {
    /// Create a new household service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            households: HouseholdRepository::new(pool),
            members: MemberRepository::new(pool),
        }
    }

    /// Create a household with a fresh join code and make `owner` its first member.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::JoinCodeExhausted` if no unique code was found
    /// within `MAX_JOIN_CODE_ATTEMPTS`.
    /// Returns `ServiceError::Repository` for database errors.
    pub async fn create(
        &self,
        owner: UserId,
        name: &str,
        nickname: &str,
    ) -> Result<(Household, Member), ServiceError> {
        self.create_with_codes(owner, name, nickname, || {
            JoinCode::generate(&mut rand::rng())
        })
        .await
    }

    async fn create_with_codes(
        &self,
        owner: UserId,
        name: &str,
        nickname: &str,
        mut next_code: impl FnMut() -> JoinCode + Send,
    ) -> Result<(Household, Member), ServiceError> {
        for attempt in 1..=MAX_JOIN_CODE_ATTEMPTS {
            let code = next_code();
            match self
                .households
                .create_with_owner(name, &code, owner, nickname)
                .await
            {
                Ok((household, member)) => {
                    tracing::info!(household_id = %household.id, %owner, "Household created");
                    add_breadcrumb(
                        "household",
                        "Household created",
                        Some(&[("household_id", &household.id.to_string())]),
                    );
                    return Ok((household, member));
                }
                Err(RepositoryError::Conflict(_)) => {
                    tracing::debug!(attempt, "Join code collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::error!(
            attempts = MAX_JOIN_CODE_ATTEMPTS,
            "Could not allocate a unique join code"
        );
        Err(ServiceError::JoinCodeExhausted)
    }

    /// Load a household and the user's membership in it.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the household doesn't exist.
    /// Returns `ServiceError::Forbidden` if the user isn't a member.
    pub async fn require_member(
        &self,
        user_id: UserId,
        household_id: HouseholdId,
    ) -> Result<(Household, Member), ServiceError> {
        let household = self
            .households
            .get_by_id(household_id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        let member = self
            .members
            .get(user_id, household_id)
            .await?
            .ok_or(ServiceError::Forbidden)?;

        Ok((household, member))
    }

    /// Get a household the user belongs to.
    ///
    /// # Errors
    ///
    /// See [`Self::require_member`].
    pub async fn get(
        &self,
        user_id: UserId,
        household_id: HouseholdId,
    ) -> Result<Household, ServiceError> {
        let (household, _) = self.require_member(user_id, household_id).await?;
        Ok(household)
    }

    /// Join a household by its code.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidJoinCode` if the code is malformed or unknown.
    /// Returns `ServiceError::AlreadyMember` under `RejoinPolicy::Reject`.
    /// Returns `ServiceError::NicknameTaken` if another member uses the nickname.
    pub async fn join(
        &self,
        user_id: UserId,
        code: &str,
        nickname: &str,
        policy: RejoinPolicy,
    ) -> Result<JoinOutcome, ServiceError> {
        let code = JoinCode::parse(code).map_err(|_| ServiceError::InvalidJoinCode)?;
        let household = self
            .households
            .get_by_join_code(&code)
            .await?
            .ok_or(ServiceError::InvalidJoinCode)?;

        if let Some(existing) = self.members.get(user_id, household.id).await? {
            return self.rejoin(household, existing, nickname, policy).await;
        }

        let member = match self.members.create(user_id, household.id, nickname).await {
            Ok(member) => member,
            // A concurrent join by the same user won the insert
            Err(RepositoryError::DuplicateMembership) => {
                let existing = self
                    .members
                    .get(user_id, household.id)
                    .await?
                    .ok_or(ServiceError::NotFound)?;
                return self.rejoin(household, existing, nickname, policy).await;
            }
            Err(e) => return Err(ServiceError::from_nickname(e)),
        };

        tracing::info!(household_id = %household.id, %user_id, "Member joined household");
        add_breadcrumb(
            "household",
            "Joined household",
            Some(&[("household_id", &household.id.to_string())]),
        );

        Ok(JoinOutcome {
            household,
            member,
            created: true,
        })
    }

    /// Apply the re-join policy to an existing membership.
    async fn rejoin(
        &self,
        household: Household,
        existing: Member,
        nickname: &str,
        policy: RejoinPolicy,
    ) -> Result<JoinOutcome, ServiceError> {
        match policy {
            RejoinPolicy::Reject => Err(ServiceError::AlreadyMember(Box::new(household))),
            RejoinPolicy::UpdateNickname if existing.nickname == nickname => Ok(JoinOutcome {
                household,
                member: existing,
                created: false,
            }),
            RejoinPolicy::UpdateNickname => {
                let member = self
                    .members
                    .update_nickname(existing.id, nickname)
                    .await
                    .map_err(ServiceError::from_nickname)?;
                Ok(JoinOutcome {
                    household,
                    member,
                    created: false,
                })
            }
        }
    }

    /// Leave a household.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user wasn't a member.
    pub async fn leave(&self, user_id: UserId, household_id: HouseholdId) -> Result<(), ServiceError> {
        if !self.members.delete(user_id, household_id).await? {
            return Err(ServiceError::NotFound);
        }

        tracing::info!(%household_id, %user_id, "Member left household");
        Ok(())
    }

    /// Rename a household.
    ///
    /// # Errors
    ///
    /// See [`Self::require_member`].
    pub async fn rename(
        &self,
        user_id: UserId,
        household_id: HouseholdId,
        name: &str,
    ) -> Result<Household, ServiceError> {
        self.require_member(user_id, household_id).await?;
        Ok(self.households.rename(household_id, name).await?)
    }

    /// Delete a household with all its pets, entries and memberships.
    ///
    /// # Errors
    ///
    /// See [`Self::require_member`].
    pub async fn delete(&self, user_id: UserId, household_id: HouseholdId) -> Result<(), ServiceError> {
        self.require_member(user_id, household_id).await?;
        self.households.delete(household_id).await?;

        tracing::info!(%household_id, %user_id, "Household deleted");
        add_breadcrumb(
            "household",
            "Household deleted",
            Some(&[("household_id", &household_id.to_string())]),
        );
        Ok(())
    }

    /// Change the user's nickname in a household.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NicknameTaken` if another member uses it.
    /// See also [`Self::require_member`].
    pub async fn set_nickname(
        &self,
        user_id: UserId,
        household_id: HouseholdId,
        nickname: &str,
    ) -> Result<Member, ServiceError> {
        let (_, member) = self.require_member(user_id, household_id).await?;
        if member.nickname == nickname {
            return Ok(member);
        }

        self.members
            .update_nickname(member.id, nickname)
            .await
            .map_err(ServiceError::from_nickname)
    }

    /// List the user's memberships.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the query fails.
    pub async fn memberships(&self, user_id: UserId) -> Result<Vec<Membership>, ServiceError> {
        Ok(self.members.list_for_user(user_id).await?)
    }

    /// List the members of a household the user belongs to.
    ///
    /// # Errors
    ///
    /// See [`Self::require_member`].
    pub async fn members(
        &self,
        user_id: UserId,
        household_id: HouseholdId,
    ) -> Result<Vec<MemberProfile>, ServiceError> {
        self.require_member(user_id, household_id).await?;
        Ok(self.members.list_for_household(household_id).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use petcare_core::Username;

    use super::*;
    use crate::db::{UserRepository, test_support};

    async fn user(pool: &SqlitePool, name: &str) -> UserId {
        UserRepository::new(pool)
            .create(&Username::parse(name).unwrap(), "hash")
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_makes_owner_a_member() {
        let pool = test_support::pool().await;
        let alice = user(&pool, "alice").await;
        let service = HouseholdService::new(&pool);

        let (household, member) = service.create(alice, "Casa", "Owner").await.unwrap();

        assert_eq!(household.join_code.as_str().len(), JoinCode::LENGTH);
        assert_eq!(member.user_id, alice);
        assert_eq!(member.nickname, "Owner");
        assert!(service.require_member(alice, household.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_retries_on_code_collision() {
        let pool = test_support::pool().await;
        let alice = user(&pool, "alice").await;
        let service = HouseholdService::new(&pool);
        let taken = JoinCode::parse("AAAAAA").unwrap();
        let fresh = JoinCode::parse("BBBBBB").unwrap();

        let (first, _) = service
            .create_with_codes(alice, "First", "Owner", || taken.clone())
            .await
            .unwrap();

        let mut codes = vec![fresh.clone(), taken.clone(), taken.clone()];
        let (second, _) = service
            .create_with_codes(alice, "Second", "Owner", || codes.pop().unwrap())
            .await
            .unwrap();

        assert_eq!(first.join_code, taken);
        assert_eq!(second.join_code, fresh);
    }

    #[tokio::test]
    async fn test_create_gives_up_after_max_attempts() {
        let pool = test_support::pool().await;
        let alice = user(&pool, "alice").await;
        let service = HouseholdService::new(&pool);
        let taken = JoinCode::parse("AAAAAA").unwrap();

        service
            .create_with_codes(alice, "First", "Owner", || taken.clone())
            .await
            .unwrap();

        let mut calls = 0;
        let err = service
            .create_with_codes(alice, "Second", "Owner", || {
                calls += 1;
                taken.clone()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::JoinCodeExhausted));
        assert_eq!(calls, MAX_JOIN_CODE_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_require_member_checks_existence_first() {
        let pool = test_support::pool().await;
        let alice = user(&pool, "alice").await;
        let bob = user(&pool, "bob").await;
        let service = HouseholdService::new(&pool);
        let (household, _) = service.create(alice, "Casa", "Owner").await.unwrap();

        assert!(matches!(
            service.require_member(bob, household.id).await,
            Err(ServiceError::Forbidden)
        ));
        assert!(matches!(
            service.require_member(bob, HouseholdId::new(999)).await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_joins_by_one_user_are_a_rejoin() {
        let pool = test_support::pool().await;
        let alice = user(&pool, "alice").await;
        let bob = user(&pool, "bob").await;
        let service = HouseholdService::new(&pool);
        let (household, _) = service.create(alice, "Casa", "Owner").await.unwrap();
        let code = household.join_code.as_str();

        let (first, second) = tokio::join!(
            service.join(bob, code, "Bobby", RejoinPolicy::UpdateNickname),
            service.join(bob, code, "Bobby", RejoinPolicy::UpdateNickname),
        );
        let (first, second) = (first.unwrap(), second.unwrap());

        assert!(first.created != second.created);
        assert_eq!(first.member.id, second.member.id);

        let err = service
            .join(bob, code, "Bobby", RejoinPolicy::Reject)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyMember(_)));
    }

    #[tokio::test]
    async fn test_join_and_rejoin_policies() {
        let pool = test_support::pool().await;
        let alice = user(&pool, "alice").await;
        let bob = user(&pool, "bob").await;
        let service = HouseholdService::new(&pool);
        let (household, _) = service.create(alice, "Casa", "Owner").await.unwrap();
        let code = household.join_code.as_str().to_ascii_lowercase();

        let joined = service
            .join(bob, &code, "Bobby", RejoinPolicy::UpdateNickname)
            .await
            .unwrap();
        assert!(joined.created);
        assert_eq!(joined.household.id, household.id);

        let rejoined = service
            .join(bob, &code, "Rob", RejoinPolicy::UpdateNickname)
            .await
            .unwrap();
        assert!(!rejoined.created);
        assert_eq!(rejoined.member.id, joined.member.id);
        assert_eq!(rejoined.member.nickname, "Rob");

        assert!(matches!(
            service.join(bob, &code, "Rob", RejoinPolicy::Reject).await,
            Err(ServiceError::AlreadyMember(_))
        ));

        let members = service.members(alice, household.id).await.unwrap();
        assert_eq!(members.len(), 2);
    }

    #[tokio::test]
    async fn test_join_errors() {
        let pool = test_support::pool().await;
        let alice = user(&pool, "alice").await;
        let bob = user(&pool, "bob").await;
        let service = HouseholdService::new(&pool);
        let (household, _) = service.create(alice, "Casa", "Owner").await.unwrap();

        assert!(matches!(
            service
                .join(bob, "nope", "Bob", RejoinPolicy::UpdateNickname)
                .await,
            Err(ServiceError::InvalidJoinCode)
        ));
        assert!(matches!(
            service
                .join(bob, household.join_code.as_str(), "Owner", RejoinPolicy::Reject)
                .await,
            Err(ServiceError::NicknameTaken)
        ));
    }

    #[tokio::test]
    async fn test_leave() {
        let pool = test_support::pool().await;
        let alice = user(&pool, "alice").await;
        let service = HouseholdService::new(&pool);
        let (household, _) = service.create(alice, "Casa", "Owner").await.unwrap();

        service.leave(alice, household.id).await.unwrap();
        assert!(service.memberships(alice).await.unwrap().is_empty());
        assert!(matches!(
            service.leave(alice, household.id).await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_rename_delete_and_nickname() {
        let pool = test_support::pool().await;
        let alice = user(&pool, "alice").await;
        let bob = user(&pool, "bob").await;
        let service = HouseholdService::new(&pool);
        let (household, _) = service.create(alice, "Casa", "Owner").await.unwrap();
        service
            .join(bob, household.join_code.as_str(), "Bobby", RejoinPolicy::Reject)
            .await
            .unwrap();

        assert!(matches!(
            service.set_nickname(bob, household.id, "Owner").await,
            Err(ServiceError::NicknameTaken)
        ));
        let member = service.set_nickname(bob, household.id, "Rob").await.unwrap();
        assert_eq!(member.nickname, "Rob");

        let renamed = service.rename(bob, household.id, "Home").await.unwrap();
        assert_eq!(renamed.name, "Home");

        service.delete(alice, household.id).await.unwrap();
        assert!(matches!(
            service.get(alice, household.id).await,
            Err(ServiceError::NotFound)
        ));
    }
}
