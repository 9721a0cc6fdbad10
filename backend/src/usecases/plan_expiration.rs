use std::sync::Arc;

use chrono::{DateTime, Utc};
use crates::domain::{
    repositories::{plan_accounts::PlanAccountRepository, properties::PropertyLifecycleRepository},
    value_objects::{
        enums::plan_tiers::PlanTier,
        plan_enforcement::{ExpirationOutcome, select_excess_active},
        plans::PlanLimits,
    },
};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{
    errors::{UseCaseError, UseCaseResult},
    plan_limits::{count_active, load_account},
};

/// Downgrades expired paid plans to free and trims the listings above the free limit.
pub struct PlanExpirationUseCase<U, P>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    account_repo: Arc<U>,
    property_repo: Arc<P>,
}

impl<U, P> PlanExpirationUseCase<U, P>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    pub fn new(account_repo: Arc<U>, property_repo: Arc<P>) -> Self {
        Self {
            account_repo,
            property_repo,
        }
    }

    pub async fn check_expiration(&self, user_id: Uuid) -> UseCaseResult<ExpirationOutcome> {
        self.check_expiration_at(user_id, Utc::now()).await
    }

    pub async fn check_expiration_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> UseCaseResult<ExpirationOutcome> {
        let account = load_account(self.account_repo.as_ref(), user_id).await?;
        let old_tier = account.stored_tier();

        if !account.is_plan_expired(now) {
            let active = count_active(self.property_repo.as_ref(), user_id).await?;
            return Ok(ExpirationOutcome::unchanged(user_id, old_tier, active));
        }

        let keep_active = PlanLimits::for_tier(PlanTier::Free).max_active_properties;
        let applied = self
            .account_repo
            .expire_plan(user_id, keep_active, now)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "plan_expiration: failed to expire plan");
                UseCaseError::Internal(err)
            })?;

        let remaining_active = count_active(self.property_repo.as_ref(), user_id).await?;

        let Some(deactivated_ids) = applied else {
            warn!(
                %user_id,
                "plan_expiration: plan already downgraded by a concurrent run"
            );
            return Ok(ExpirationOutcome::unchanged(
                user_id,
                PlanTier::Free,
                remaining_active,
            ));
        };

        info!(
            %user_id,
            old_tier = %old_tier,
            deactivated_count = deactivated_ids.len(),
            remaining_active,
            "plan_expiration: plan expired and downgraded to free"
        );

        Ok(ExpirationOutcome {
            user_id,
            expired: true,
            old_tier,
            new_tier: PlanTier::Free,
            deactivated_count: deactivated_ids.len(),
            deactivated_ids,
            remaining_active,
        })
    }

    /// What [`Self::check_expiration_at`] would do, without writing anything.
    pub async fn preview_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> UseCaseResult<ExpirationOutcome> {
        let account = load_account(self.account_repo.as_ref(), user_id).await?;
        let old_tier = account.stored_tier();

        let active = self
            .property_repo
            .list_active_by_owner(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "plan_expiration: failed to list active listings");
                UseCaseError::Internal(err)
            })?;
        let active_count = i64::try_from(active.len()).unwrap_or(i64::MAX);

        if !account.is_plan_expired(now) {
            return Ok(ExpirationOutcome::unchanged(user_id, old_tier, active_count));
        }

        let deactivated_ids = select_excess_active(
            &active,
            PlanLimits::for_tier(PlanTier::Free).max_active_properties,
        );
        let deactivated = i64::try_from(deactivated_ids.len()).unwrap_or(i64::MAX);

        Ok(ExpirationOutcome {
            user_id,
            expired: true,
            old_tier,
            new_tier: PlanTier::Free,
            deactivated_count: deactivated_ids.len(),
            deactivated_ids,
            remaining_active: active_count - deactivated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_fixtures::{account, expired_account, property};
    use chrono::Duration;
    use crates::domain::{
        entities::users::UserEntity,
        repositories::{
            plan_accounts::MockPlanAccountRepository, properties::MockPropertyLifecycleRepository,
        },
    };
    use mockall::predicate::{always, eq};
    use std::sync::Mutex;

    fn account_repo_returning(user: UserEntity) -> MockPlanAccountRepository {
        let mut account_repo = MockPlanAccountRepository::new();
        account_repo.expect_find_by_id().returning(move |_| {
            let user = user.clone();
            Box::pin(async move { Ok(Some(user)) })
        });
        account_repo
    }

    #[tokio::test]
    async fn professional_with_ten_listings_keeps_five_after_expiry() {
        let user_id = Uuid::new_v4();
        let listings: Vec<_> = (0..10).map(|age| property(user_id, age)).collect();
        let expected_deactivated = select_excess_active(&listings, Some(5));
        assert_eq!(expected_deactivated.len(), 5);

        let mut account_repo =
            account_repo_returning(expired_account(user_id, PlanTier::Professional));
        let deactivated = expected_deactivated.clone();
        account_repo
            .expect_expire_plan()
            .with(eq(user_id), eq(Some(5_i64)), always())
            .times(1)
            .returning(move |_, _, _| {
                let deactivated = deactivated.clone();
                Box::pin(async move { Ok(Some(deactivated)) })
            });

        let mut property_repo = MockPropertyLifecycleRepository::new();
        property_repo
            .expect_count_active_by_owner()
            .with(eq(user_id))
            .returning(|_| Box::pin(async { Ok(5) }));

        let usecase = PlanExpirationUseCase::new(Arc::new(account_repo), Arc::new(property_repo));
        let outcome = usecase.check_expiration(user_id).await.unwrap();

        assert!(outcome.expired);
        assert_eq!(outcome.old_tier, PlanTier::Professional);
        assert_eq!(outcome.new_tier, PlanTier::Free);
        assert_eq!(outcome.deactivated_count, 5);
        assert_eq!(outcome.deactivated_ids, expected_deactivated);
        assert_eq!(outcome.remaining_active, 5);
    }

    #[tokio::test]
    async fn active_plan_is_left_alone() {
        let user_id = Uuid::new_v4();
        let end = Utc::now() + Duration::days(3);
        let mut account_repo = account_repo_returning(account(user_id, PlanTier::Pro, Some(end)));
        account_repo.expect_expire_plan().never();

        let mut property_repo = MockPropertyLifecycleRepository::new();
        property_repo
            .expect_count_active_by_owner()
            .returning(|_| Box::pin(async { Ok(8) }));

        let usecase = PlanExpirationUseCase::new(Arc::new(account_repo), Arc::new(property_repo));
        let outcome = usecase.check_expiration(user_id).await.unwrap();

        assert!(!outcome.expired);
        assert_eq!(outcome.new_tier, PlanTier::Pro);
        assert_eq!(outcome.remaining_active, 8);
    }

    #[tokio::test]
    async fn second_run_after_downgrade_changes_nothing() {
        let user_id = Uuid::new_v4();
        // Stored state after a first run: free tier, end date still in the past.
        let downgraded = expired_account(user_id, PlanTier::Free);
        let mut account_repo = account_repo_returning(downgraded);
        account_repo.expect_expire_plan().never();

        let mut property_repo = MockPropertyLifecycleRepository::new();
        property_repo
            .expect_count_active_by_owner()
            .returning(|_| Box::pin(async { Ok(5) }));

        let usecase = PlanExpirationUseCase::new(Arc::new(account_repo), Arc::new(property_repo));

        for _ in 0..2 {
            let outcome = usecase.check_expiration(user_id).await.unwrap();
            assert!(!outcome.expired);
            assert_eq!(outcome.deactivated_count, 0);
            assert_eq!(outcome.remaining_active, 5);
        }
    }

    #[tokio::test]
    async fn concurrent_downgrade_reports_not_expired() {
        let user_id = Uuid::new_v4();
        let mut account_repo = account_repo_returning(expired_account(user_id, PlanTier::Premium));
        account_repo
            .expect_expire_plan()
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(None) }));

        let mut property_repo = MockPropertyLifecycleRepository::new();
        property_repo
            .expect_count_active_by_owner()
            .returning(|_| Box::pin(async { Ok(4) }));

        let usecase = PlanExpirationUseCase::new(Arc::new(account_repo), Arc::new(property_repo));
        let outcome = usecase.check_expiration(user_id).await.unwrap();

        assert!(!outcome.expired);
        assert_eq!(outcome.new_tier, PlanTier::Free);
        assert!(outcome.deactivated_ids.is_empty());
    }

    #[tokio::test]
    async fn active_count_never_exceeds_free_limit_after_expiry() {
        let user_id = Uuid::new_v4();
        let listings: Vec<_> = (0..23).map(|age| property(user_id, age)).collect();
        let store = Arc::new(Mutex::new(listings));

        let mut account_repo = account_repo_returning(expired_account(user_id, PlanTier::Business));
        let writer = Arc::clone(&store);
        account_repo
            .expect_expire_plan()
            .returning(move |_, keep, _| {
                let mut listings = writer.lock().unwrap();
                let excess = select_excess_active(&listings, keep);
                for listing in listings.iter_mut() {
                    if excess.contains(&listing.id) {
                        listing.is_active = false;
                    }
                }
                Box::pin(async move { Ok(Some(excess)) })
            });

        let mut property_repo = MockPropertyLifecycleRepository::new();
        let reader = Arc::clone(&store);
        property_repo.expect_count_active_by_owner().returning(move |_| {
            let active = reader.lock().unwrap().iter().filter(|p| p.is_active).count() as i64;
            Box::pin(async move { Ok(active) })
        });

        let usecase = PlanExpirationUseCase::new(Arc::new(account_repo), Arc::new(property_repo));
        let outcome = usecase.check_expiration(user_id).await.unwrap();

        let free_limit = PlanLimits::for_tier(PlanTier::Free)
            .max_active_properties
            .unwrap();
        assert!(outcome.remaining_active <= free_limit);
        assert_eq!(outcome.deactivated_count, 18);
    }

    #[tokio::test]
    async fn preview_selects_without_writing() {
        let user_id = Uuid::new_v4();
        let listings: Vec<_> = (0..7).map(|age| property(user_id, age)).collect();
        let oldest_two: Vec<Uuid> = listings[5..].iter().map(|p| p.id).collect();

        let mut account_repo = account_repo_returning(expired_account(user_id, PlanTier::Pro));
        account_repo.expect_expire_plan().never();

        let mut property_repo = MockPropertyLifecycleRepository::new();
        property_repo
            .expect_list_active_by_owner()
            .returning(move |_| {
                let listings = listings.clone();
                Box::pin(async move { Ok(listings) })
            });

        let usecase = PlanExpirationUseCase::new(Arc::new(account_repo), Arc::new(property_repo));
        let outcome = usecase.preview_at(user_id, Utc::now()).await.unwrap();

        assert!(outcome.expired);
        assert_eq!(outcome.deactivated_ids, oldest_two);
        assert_eq!(outcome.remaining_active, 5);
    }
}
