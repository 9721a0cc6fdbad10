use std::sync::Arc;

use chrono::{DateTime, Utc};
use crates::domain::{
    entities::users::UserEntity,
    repositories::{plan_accounts::PlanAccountRepository, properties::PropertyLifecycleRepository},
    value_objects::plans::{ActivationCheck, PlanCatalogEntry, PlanLimits, UserPlanInfoDto, plan_catalog},
};
use tracing::{error, info};
use uuid::Uuid;

use super::errors::{UseCaseError, UseCaseResult};

/// Loads the account or fails with `NotFound`.
pub(crate) async fn load_account<U>(accounts: &U, user_id: Uuid) -> UseCaseResult<UserEntity>
where
    U: PlanAccountRepository + Send + Sync,
{
    accounts
        .find_by_id(user_id)
        .await
        .map_err(|err| {
            error!(%user_id, db_error = ?err, "plans: failed to load account");
            UseCaseError::Internal(err)
        })?
        .ok_or(UseCaseError::NotFound("user"))
}

pub(crate) async fn count_active<P>(properties: &P, user_id: Uuid) -> UseCaseResult<i64>
where
    P: PropertyLifecycleRepository + Send + Sync,
{
    properties.count_active_by_owner(user_id).await.map_err(|err| {
        error!(%user_id, db_error = ?err, "plans: failed to count active listings");
        UseCaseError::Internal(err)
    })
}

pub struct PlanLimitsUseCase<U, P>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    account_repo: Arc<U>,
    property_repo: Arc<P>,
}

impl<U, P> PlanLimitsUseCase<U, P>
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

    pub fn catalog(&self) -> Vec<PlanCatalogEntry> {
        plan_catalog()
    }

    pub async fn get_user_plan_limits(&self, user_id: Uuid) -> UseCaseResult<PlanLimits> {
        self.get_user_plan_limits_at(user_id, Utc::now()).await
    }

    pub async fn get_user_plan_limits_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> UseCaseResult<PlanLimits> {
        let account = load_account(self.account_repo.as_ref(), user_id).await?;
        Ok(PlanLimits::for_tier(account.effective_tier(now)))
    }

    pub async fn get_user_plan_info(&self, user_id: Uuid) -> UseCaseResult<UserPlanInfoDto> {
        let now = Utc::now();
        let account = load_account(self.account_repo.as_ref(), user_id).await?;
        let active_properties = count_active(self.property_repo.as_ref(), user_id).await?;
        let effective_tier = account.effective_tier(now);

        Ok(UserPlanInfoDto {
            user_id,
            plan_tier: account.stored_tier(),
            effective_tier,
            is_founder: account.is_founder,
            founder_discount: account.founder_discount_percent(),
            plan_start_date: account.plan_start_date,
            plan_end_date: account.plan_end_date,
            is_plan_active: account.is_plan_active(now),
            days_remaining: account.days_remaining(now),
            active_properties,
            limits: PlanLimits::for_tier(effective_tier),
        })
    }

    pub async fn can_user_activate_property(&self, user_id: Uuid) -> UseCaseResult<ActivationCheck> {
        let limits = self.get_user_plan_limits(user_id).await?;
        let active_count = count_active(self.property_repo.as_ref(), user_id).await?;
        let allowed = limits.can_activate_one_more(active_count);

        info!(
            %user_id,
            tier = %limits.plan_tier,
            active_count,
            allowed,
            "plans: activation check"
        );

        Ok(ActivationCheck {
            allowed,
            active_count,
            max_active_properties: limits.max_active_properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_fixtures::{account, expired_account};
    use chrono::Duration;
    use crates::domain::{
        repositories::{
            plan_accounts::MockPlanAccountRepository, properties::MockPropertyLifecycleRepository,
        },
        value_objects::enums::plan_tiers::PlanTier,
    };
    use mockall::predicate::eq;

    fn usecase_with(
        user: Option<UserEntity>,
        active: i64,
    ) -> PlanLimitsUseCase<MockPlanAccountRepository, MockPropertyLifecycleRepository> {
        let mut account_repo = MockPlanAccountRepository::new();
        let mut property_repo = MockPropertyLifecycleRepository::new();

        account_repo.expect_find_by_id().returning(move |_| {
            let user = user.clone();
            Box::pin(async move { Ok(user) })
        });
        property_repo
            .expect_count_active_by_owner()
            .returning(move |_| Box::pin(async move { Ok(active) }));

        PlanLimitsUseCase::new(Arc::new(account_repo), Arc::new(property_repo))
    }

    #[tokio::test]
    async fn expired_paid_plan_resolves_to_free_limits() {
        let user_id = Uuid::new_v4();
        let usecase = usecase_with(Some(expired_account(user_id, PlanTier::Professional)), 0);

        let limits = usecase.get_user_plan_limits(user_id).await.unwrap();

        assert_eq!(limits.plan_tier, PlanTier::Free);
        assert_eq!(limits.max_active_properties, Some(5));
    }

    #[tokio::test]
    async fn plan_info_reports_stored_and_effective_tier() {
        let user_id = Uuid::new_v4();
        let usecase = usecase_with(Some(expired_account(user_id, PlanTier::Business)), 7);

        let info = usecase.get_user_plan_info(user_id).await.unwrap();

        assert_eq!(info.plan_tier, PlanTier::Business);
        assert_eq!(info.effective_tier, PlanTier::Free);
        assert!(!info.is_plan_active);
        assert_eq!(info.active_properties, 7);
    }

    #[tokio::test]
    async fn activation_is_refused_at_the_limit() {
        let user_id = Uuid::new_v4();
        let usecase = usecase_with(Some(account(user_id, PlanTier::Free, None)), 5);

        let check = usecase.can_user_activate_property(user_id).await.unwrap();

        assert!(!check.allowed);
        assert_eq!(check.active_count, 5);
        assert_eq!(check.max_active_properties, Some(5));
    }

    #[tokio::test]
    async fn activation_is_allowed_on_active_paid_plan() {
        let user_id = Uuid::new_v4();
        let end = Utc::now() + Duration::days(20);
        let usecase = usecase_with(Some(account(user_id, PlanTier::Professional, Some(end))), 12);

        let check = usecase.can_user_activate_property(user_id).await.unwrap();

        assert!(check.allowed);
        assert_eq!(check.max_active_properties, Some(20));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let user_id = Uuid::new_v4();
        let mut account_repo = MockPlanAccountRepository::new();
        account_repo
            .expect_find_by_id()
            .with(eq(user_id))
            .times(1)
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = PlanLimitsUseCase::new(
            Arc::new(account_repo),
            Arc::new(MockPropertyLifecycleRepository::new()),
        );

        let err = usecase.get_user_plan_limits(user_id).await.unwrap_err();
        assert!(matches!(err, UseCaseError::NotFound("user")));
    }
}
