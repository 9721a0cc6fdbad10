use std::sync::Arc;

use chrono::Utc;
use crates::domain::{
    repositories::{
        plan_accounts::PlanAccountRepository, properties::PropertyLifecycleRepository,
        property_reports::PropertyReportRepository,
    },
    value_objects::admin_stats::{AdminStatsDto, users_by_tier},
};
use tracing::error;

use super::errors::{UseCaseError, UseCaseResult};

pub struct AdminStatsUseCase<U, P, R>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
    R: PropertyReportRepository + Send + Sync + 'static,
{
    account_repo: Arc<U>,
    property_repo: Arc<P>,
    report_repo: Arc<R>,
}

impl<U, P, R> AdminStatsUseCase<U, P, R>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
    R: PropertyReportRepository + Send + Sync + 'static,
{
    pub fn new(account_repo: Arc<U>, property_repo: Arc<P>, report_repo: Arc<R>) -> Self {
        Self {
            account_repo,
            property_repo,
            report_repo,
        }
    }

    pub async fn stats(&self) -> UseCaseResult<AdminStatsDto> {
        let internal = |what: &'static str| {
            move |err: anyhow::Error| {
                error!(db_error = ?err, "admin_stats: failed to load {what}");
                UseCaseError::Internal(err)
            }
        };

        let tier_rows = self
            .account_repo
            .count_users_by_tier()
            .await
            .map_err(internal("users by tier"))?;
        let founders = self
            .account_repo
            .count_founders()
            .await
            .map_err(internal("founders"))?;
        let expired_paid_plans = self
            .account_repo
            .count_expired_paid(Utc::now())
            .await
            .map_err(internal("expired plans"))?;
        let (active_properties, inactive_properties) = self
            .property_repo
            .count_by_activity()
            .await
            .map_err(internal("listing counts"))?;
        let pending_reports = self
            .report_repo
            .count_pending()
            .await
            .map_err(internal("pending reports"))?;

        Ok(AdminStatsDto {
            users_by_tier: users_by_tier(tier_rows),
            founders,
            expired_paid_plans,
            active_properties,
            inactive_properties,
            pending_reports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::repositories::{
        plan_accounts::MockPlanAccountRepository, properties::MockPropertyLifecycleRepository,
        property_reports::MockPropertyReportRepository,
    };

    #[tokio::test]
    async fn aggregates_all_counters() {
        let mut account_repo = MockPlanAccountRepository::new();
        account_repo.expect_count_users_by_tier().returning(|| {
            Box::pin(async {
                Ok(vec![
                    (Some("free".to_string()), 40),
                    (None, 2),
                    (Some("professional".to_string()), 6),
                ])
            })
        });
        account_repo
            .expect_count_founders()
            .returning(|| Box::pin(async { Ok(3) }));
        account_repo
            .expect_count_expired_paid()
            .returning(|_| Box::pin(async { Ok(1) }));

        let mut property_repo = MockPropertyLifecycleRepository::new();
        property_repo
            .expect_count_by_activity()
            .returning(|| Box::pin(async { Ok((120, 35)) }));

        let mut report_repo = MockPropertyReportRepository::new();
        report_repo
            .expect_count_pending()
            .returning(|| Box::pin(async { Ok(4) }));

        let usecase = AdminStatsUseCase::new(
            Arc::new(account_repo),
            Arc::new(property_repo),
            Arc::new(report_repo),
        );
        let stats = usecase.stats().await.unwrap();

        assert_eq!(stats.users_by_tier["free"], 42);
        assert_eq!(stats.users_by_tier["professional"], 6);
        assert_eq!(stats.founders, 3);
        assert_eq!(stats.expired_paid_plans, 1);
        assert_eq!(stats.active_properties, 120);
        assert_eq!(stats.inactive_properties, 35);
        assert_eq!(stats.pending_reports, 4);
    }
}
