use anyhow::Result;
use backend::usecases::plan_expiration::PlanExpirationUseCase;
use chrono::{DateTime, Utc};
use crates::domain::repositories::{
    plan_accounts::PlanAccountRepository, properties::PropertyLifecycleRepository,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

const MAX_REPORTED_IDS: usize = 20;

#[derive(Debug, Clone, Default)]
pub struct SweepExpiredPlansParams {
    pub limit: Option<i64>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SweepExpiredPlansResult {
    pub scanned: usize,
    pub expired: usize,
    pub deactivated: usize,
    pub failed: usize,
    pub dry_run: bool,
    pub expired_ids: Vec<Uuid>,
    pub failed_ids: Vec<Uuid>,
}

pub struct SweepExpiredPlansUseCase<U, P>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    account_repo: Arc<U>,
    expiration: Arc<PlanExpirationUseCase<U, P>>,
    batch_limit: i64,
    // Last account id scanned; the next sweep resumes after it.
    cursor: Mutex<Option<Uuid>>,
}

impl<U, P> SweepExpiredPlansUseCase<U, P>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    pub fn new(
        account_repo: Arc<U>,
        expiration: Arc<PlanExpirationUseCase<U, P>>,
        batch_limit: i64,
    ) -> Self {
        Self {
            account_repo,
            expiration,
            batch_limit,
            cursor: Mutex::new(None),
        }
    }

    pub async fn run(&self, params: SweepExpiredPlansParams) -> Result<SweepExpiredPlansResult> {
        self.run_at(params, Utc::now()).await
    }

    pub async fn run_at(
        &self,
        params: SweepExpiredPlansParams,
        now: DateTime<Utc>,
    ) -> Result<SweepExpiredPlansResult> {
        let limit = params
            .limit
            .filter(|l| *l > 0)
            .unwrap_or(self.batch_limit);

        let after = *self.cursor.lock().await;
        let mut user_ids = self
            .account_repo
            .list_expired_user_ids(now, after, limit)
            .await?;
        if user_ids.is_empty() && after.is_some() {
            user_ids = self
                .account_repo
                .list_expired_user_ids(now, None, limit)
                .await?;
        }

        if !params.dry_run {
            let next = if (user_ids.len() as i64) < limit {
                None
            } else {
                user_ids.last().copied()
            };
            *self.cursor.lock().await = next;
        }

        let mut result = SweepExpiredPlansResult {
            scanned: user_ids.len(),
            dry_run: params.dry_run,
            ..Default::default()
        };

        for user_id in user_ids {
            let outcome = if params.dry_run {
                self.expiration.preview_at(user_id, now).await
            } else {
                self.expiration.check_expiration_at(user_id, now).await
            };

            match outcome {
                Ok(outcome) if outcome.expired => {
                    result.expired += 1;
                    result.deactivated += outcome.deactivated_count;
                    if result.expired_ids.len() < MAX_REPORTED_IDS {
                        result.expired_ids.push(user_id);
                    }
                }
                // Another run downgraded the account first.
                Ok(_) => {}
                Err(err) => {
                    error!(%user_id, error = ?err, "sweep_expired_plans: failed to expire plan");
                    result.failed += 1;
                    if result.failed_ids.len() < MAX_REPORTED_IDS {
                        result.failed_ids.push(user_id);
                    }
                }
            }
        }

        info!(
            scanned = result.scanned,
            expired = result.expired,
            deactivated = result.deactivated,
            failed = result.failed,
            dry_run = result.dry_run,
            "sweep_expired_plans: sweep finished"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::Duration;
    use crates::domain::{
        entities::users::UserEntity,
        repositories::{
            plan_accounts::MockPlanAccountRepository, properties::MockPropertyLifecycleRepository,
        },
        value_objects::enums::plan_tiers::PlanTier,
    };
    use mockall::predicate::{always, eq};

    fn expired_account(user_id: Uuid, now: DateTime<Utc>) -> UserEntity {
        UserEntity {
            id: user_id,
            email: None,
            company_name: None,
            plan_tier: Some(PlanTier::Business.to_string()),
            is_founder: false,
            founder_discount: None,
            plan_start_date: Some(now - Duration::days(31)),
            plan_end_date: Some(now - Duration::hours(2)),
            created_at: now - Duration::days(200),
            updated_at: now - Duration::days(31),
        }
    }

    fn sweep(
        account_repo: MockPlanAccountRepository,
        property_repo: MockPropertyLifecycleRepository,
    ) -> SweepExpiredPlansUseCase<MockPlanAccountRepository, MockPropertyLifecycleRepository> {
        let account_repo = Arc::new(account_repo);
        let expiration = Arc::new(PlanExpirationUseCase::new(
            Arc::clone(&account_repo),
            Arc::new(property_repo),
        ));
        SweepExpiredPlansUseCase::new(account_repo, expiration, 100)
    }

    #[tokio::test]
    async fn one_failing_account_does_not_stop_the_sweep() {
        let now = Utc::now();
        let healthy = Uuid::new_v4();
        let broken = Uuid::new_v4();

        let mut account_repo = MockPlanAccountRepository::new();
        account_repo
            .expect_list_expired_user_ids()
            .with(eq(now), eq(None), eq(100_i64))
            .times(1)
            .returning(move |_, _, _| Box::pin(async move { Ok(vec![broken, healthy]) }));
        account_repo
            .expect_find_by_id()
            .with(eq(broken))
            .returning(|_| Box::pin(async move { Err(anyhow!("connection reset")) }));
        account_repo
            .expect_find_by_id()
            .with(eq(healthy))
            .returning(move |id| {
                let user = expired_account(id, now);
                Box::pin(async move { Ok(Some(user)) })
            });
        let deactivated = vec![Uuid::new_v4(), Uuid::new_v4()];
        let returned = deactivated.clone();
        account_repo
            .expect_expire_plan()
            .with(eq(healthy), eq(Some(5_i64)), eq(now))
            .times(1)
            .returning(move |_, _, _| {
                let returned = returned.clone();
                Box::pin(async move { Ok(Some(returned)) })
            });

        let mut property_repo = MockPropertyLifecycleRepository::new();
        property_repo
            .expect_count_active_by_owner()
            .with(eq(healthy))
            .returning(|_| Box::pin(async move { Ok(5) }));

        let result = sweep(account_repo, property_repo)
            .run_at(SweepExpiredPlansParams::default(), now)
            .await
            .unwrap();

        assert_eq!(result.scanned, 2);
        assert_eq!(result.expired, 1);
        assert_eq!(result.deactivated, deactivated.len());
        assert_eq!(result.failed, 1);
        assert_eq!(result.expired_ids, vec![healthy]);
        assert_eq!(result.failed_ids, vec![broken]);
    }

    #[tokio::test]
    async fn dry_run_previews_without_writing() {
        let now = Utc::now();
        let user_id = Uuid::new_v4();

        let mut account_repo = MockPlanAccountRepository::new();
        account_repo
            .expect_list_expired_user_ids()
            .with(always(), always(), eq(10_i64))
            .returning(move |_, _, _| Box::pin(async move { Ok(vec![user_id]) }));
        account_repo.expect_find_by_id().returning(move |id| {
            let user = expired_account(id, now);
            Box::pin(async move { Ok(Some(user)) })
        });
        account_repo.expect_expire_plan().times(0);

        let mut property_repo = MockPropertyLifecycleRepository::new();
        property_repo
            .expect_list_active_by_owner()
            .with(eq(user_id))
            .returning(|_| Box::pin(async move { Ok(Vec::new()) }));

        let result = sweep(account_repo, property_repo)
            .run_at(
                SweepExpiredPlansParams {
                    limit: Some(10),
                    dry_run: true,
                },
                now,
            )
            .await
            .unwrap();

        assert!(result.dry_run);
        assert_eq!(result.expired, 1);
        assert_eq!(result.deactivated, 0);
    }

    #[tokio::test]
    async fn account_downgraded_concurrently_is_not_counted() {
        let now = Utc::now();
        let user_id = Uuid::new_v4();

        let mut account_repo = MockPlanAccountRepository::new();
        account_repo
            .expect_list_expired_user_ids()
            .returning(move |_, _, _| Box::pin(async move { Ok(vec![user_id]) }));
        account_repo.expect_find_by_id().returning(move |id| {
            let user = expired_account(id, now);
            Box::pin(async move { Ok(Some(user)) })
        });
        account_repo
            .expect_expire_plan()
            .returning(|_, _, _| Box::pin(async move { Ok(None) }));

        let mut property_repo = MockPropertyLifecycleRepository::new();
        property_repo
            .expect_count_active_by_owner()
            .returning(|_| Box::pin(async move { Ok(3) }));

        let result = sweep(account_repo, property_repo)
            .run_at(
                SweepExpiredPlansParams {
                    limit: Some(-1),
                    dry_run: false,
                },
                now,
            )
            .await
            .unwrap();

        assert_eq!(result.scanned, 1);
        assert_eq!(result.expired, 0);
        assert_eq!(result.failed, 0);
    }

    #[tokio::test]
    async fn listing_failure_aborts_the_sweep() {
        let mut account_repo = MockPlanAccountRepository::new();
        account_repo
            .expect_list_expired_user_ids()
            .returning(|_, _, _| Box::pin(async move { Err(anyhow!("pool timed out")) }));

        let result = sweep(account_repo, MockPropertyLifecycleRepository::new())
            .run(SweepExpiredPlansParams::default())
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn failing_accounts_do_not_starve_the_rest_of_the_backlog() {
        let now = Utc::now();
        let (first, second, third) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let mut account_repo = MockPlanAccountRepository::new();
        account_repo
            .expect_list_expired_user_ids()
            .with(eq(now), eq(None), eq(2_i64))
            .times(1)
            .returning(move |_, _, _| Box::pin(async move { Ok(vec![first, second]) }));
        account_repo
            .expect_list_expired_user_ids()
            .with(eq(now), eq(Some(second)), eq(2_i64))
            .times(1)
            .returning(move |_, _, _| Box::pin(async move { Ok(vec![third]) }));
        account_repo
            .expect_find_by_id()
            .returning(|_| Box::pin(async move { Err(anyhow!("connection reset")) }));

        let usecase = sweep(account_repo, MockPropertyLifecycleRepository::new());
        let params = SweepExpiredPlansParams {
            limit: Some(2),
            dry_run: false,
        };

        let first_run = usecase.run_at(params.clone(), now).await.unwrap();
        let second_run = usecase.run_at(params, now).await.unwrap();

        assert_eq!(first_run.failed_ids, vec![first, second]);
        assert_eq!(second_run.failed_ids, vec![third]);
    }

    #[tokio::test]
    async fn exhausted_cursor_wraps_to_the_start() {
        let now = Utc::now();
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());

        let mut account_repo = MockPlanAccountRepository::new();
        account_repo
            .expect_list_expired_user_ids()
            .withf(|_, after, _| after.is_none())
            .times(2)
            .returning(move |_, _, _| Box::pin(async move { Ok(vec![first, second]) }));
        account_repo
            .expect_list_expired_user_ids()
            .with(always(), eq(Some(second)), eq(2_i64))
            .times(1)
            .returning(|_, _, _| Box::pin(async move { Ok(Vec::new()) }));
        account_repo
            .expect_find_by_id()
            .returning(|_| Box::pin(async move { Err(anyhow!("connection reset")) }));

        let usecase = sweep(account_repo, MockPropertyLifecycleRepository::new());
        let params = SweepExpiredPlansParams {
            limit: Some(2),
            dry_run: false,
        };

        usecase.run_at(params.clone(), now).await.unwrap();
        let wrapped = usecase.run_at(params, now).await.unwrap();

        assert_eq!(wrapped.scanned, 2);
        assert_eq!(wrapped.failed_ids, vec![first, second]);
    }
}
