use std::sync::Arc;

use chrono::Utc;
use crates::domain::{
    repositories::{plan_accounts::PlanAccountRepository, properties::PropertyLifecycleRepository},
    value_objects::{plan_enforcement::ReactivationOutcome, plans::PlanLimits},
};
use tracing::{error, info};
use uuid::Uuid;

use super::{
    errors::{UseCaseError, UseCaseResult},
    plan_limits::{count_active, load_account},
};

pub struct PlanReactivationUseCase<U, P>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    account_repo: Arc<U>,
    property_repo: Arc<P>,
}

impl<U, P> PlanReactivationUseCase<U, P>
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

    /// Reactivates up to the limit of the user's effective tier.
    pub async fn reactivate_for_current_plan(
        &self,
        user_id: Uuid,
    ) -> UseCaseResult<ReactivationOutcome> {
        let account = load_account(self.account_repo.as_ref(), user_id).await?;
        let limits = PlanLimits::for_tier(account.effective_tier(Utc::now()));
        self.reactivate(user_id, limits.max_active_properties).await
    }

    /// Brings auto-deactivated listings back while staying within `max_active` (`None` = unlimited).
    pub async fn reactivate(
        &self,
        user_id: Uuid,
        max_active: Option<i64>,
    ) -> UseCaseResult<ReactivationOutcome> {
        if max_active.is_some_and(|max| max < 0) {
            return Err(UseCaseError::BadRequest(
                "max_active_properties must not be negative".to_string(),
            ));
        }

        load_account(self.account_repo.as_ref(), user_id).await?;

        let reactivated_ids = self
            .account_repo
            .reactivate_within_limit(user_id, max_active, Utc::now())
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "plan_reactivation: failed to reactivate listings");
                UseCaseError::Internal(err)
            })?;

        let active_after = count_active(self.property_repo.as_ref(), user_id).await?;

        info!(
            %user_id,
            reactivated_count = reactivated_ids.len(),
            active_after,
            "plan_reactivation: listings reactivated"
        );

        Ok(ReactivationOutcome {
            user_id,
            reactivated_count: reactivated_ids.len(),
            reactivated_ids,
            active_after,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_fixtures::{account, expired_account, inactive_property};
    use chrono::Duration;
    use crates::domain::{
        repositories::{
            plan_accounts::MockPlanAccountRepository, properties::MockPropertyLifecycleRepository,
        },
        value_objects::{
            enums::{deactivation_reasons::DeactivationReason, plan_tiers::PlanTier},
            plan_enforcement::select_for_reactivation,
        },
    };
    use mockall::predicate::{always, eq};

    #[tokio::test]
    async fn reactivates_only_the_free_slots() {
        let user_id = Uuid::new_v4();
        let candidates: Vec<_> = (0..8)
            .map(|_| inactive_property(user_id, DeactivationReason::PlanExpired))
            .collect();
        let current_active = 15_i64;

        let mut account_repo = MockPlanAccountRepository::new();
        let end = Utc::now() + Duration::days(30);
        account_repo.expect_find_by_id().returning(move |_| {
            Box::pin(async move { Ok(Some(account(user_id, PlanTier::Professional, Some(end)))) })
        });
        account_repo
            .expect_reactivate_within_limit()
            .with(eq(user_id), eq(Some(20_i64)), always())
            .times(1)
            .returning(move |_, max, _| {
                let slots = max.map(|max| max - current_active);
                let chosen = select_for_reactivation(&candidates, slots);
                Box::pin(async move { Ok(chosen) })
            });

        let mut property_repo = MockPropertyLifecycleRepository::new();
        property_repo
            .expect_count_active_by_owner()
            .returning(move |_| Box::pin(async move { Ok(20) }));

        let usecase =
            PlanReactivationUseCase::new(Arc::new(account_repo), Arc::new(property_repo));
        let outcome = usecase.reactivate_for_current_plan(user_id).await.unwrap();

        assert_eq!(outcome.reactivated_count, 5);
        assert!(outcome.active_after <= 20);
    }

    #[tokio::test]
    async fn expired_plan_reactivates_against_free_limit() {
        let user_id = Uuid::new_v4();
        let mut account_repo = MockPlanAccountRepository::new();
        account_repo.expect_find_by_id().returning(move |_| {
            Box::pin(async move { Ok(Some(expired_account(user_id, PlanTier::Premium))) })
        });
        account_repo
            .expect_reactivate_within_limit()
            .with(eq(user_id), eq(Some(5_i64)), always())
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(Vec::new()) }));

        let mut property_repo = MockPropertyLifecycleRepository::new();
        property_repo
            .expect_count_active_by_owner()
            .returning(|_| Box::pin(async { Ok(5) }));

        let usecase =
            PlanReactivationUseCase::new(Arc::new(account_repo), Arc::new(property_repo));
        let outcome = usecase.reactivate_for_current_plan(user_id).await.unwrap();

        assert_eq!(outcome.reactivated_count, 0);
        assert_eq!(outcome.active_after, 5);
    }

    #[tokio::test]
    async fn negative_limit_is_rejected() {
        let usecase = PlanReactivationUseCase::new(
            Arc::new(MockPlanAccountRepository::new()),
            Arc::new(MockPropertyLifecycleRepository::new()),
        );

        let err = usecase.reactivate(Uuid::new_v4(), Some(-1)).await.unwrap_err();
        assert!(matches!(err, UseCaseError::BadRequest(_)));
    }
}
