use std::sync::Arc;

use chrono::{Duration, Utc};
use crates::domain::{
    repositories::{attachments::AttachmentUsageRepository, plan_accounts::PlanAccountRepository},
    value_objects::{
        attachments::{
            AttachmentFileMeta, AttachmentValidation, check_daily_quota, check_files_against_plan,
        },
        plans::PlanLimits,
    },
};
use tracing::{error, info};
use uuid::Uuid;

use super::{
    errors::{UseCaseError, UseCaseResult},
    plan_limits::load_account,
};

pub struct AttachmentUseCase<U, A>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    A: AttachmentUsageRepository + Send + Sync + 'static,
{
    account_repo: Arc<U>,
    usage_repo: Arc<A>,
}

impl<U, A> AttachmentUseCase<U, A>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    A: AttachmentUsageRepository + Send + Sync + 'static,
{
    pub fn new(account_repo: Arc<U>, usage_repo: Arc<A>) -> Self {
        Self {
            account_repo,
            usage_repo,
        }
    }

    pub async fn validate(
        &self,
        user_id: Uuid,
        files: Vec<AttachmentFileMeta>,
    ) -> UseCaseResult<AttachmentValidation> {
        let now = Utc::now();
        let account = load_account(self.account_repo.as_ref(), user_id).await?;
        let limits = PlanLimits::for_tier(account.effective_tier(now));

        let attachment_limits =
            check_files_against_plan(&limits, &files).map_err(UseCaseError::Attachment)?;

        let daily_used = self
            .usage_repo
            .count_user_attachments_since(user_id, now - Duration::hours(24))
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "attachments: failed to count daily usage");
                UseCaseError::Internal(err)
            })?;

        check_daily_quota(&attachment_limits, daily_used, files.len())
            .map_err(UseCaseError::Attachment)?;

        info!(
            %user_id,
            tier = %limits.plan_tier,
            files = files.len(),
            daily_used,
            "attachments: upload allowed"
        );

        Ok(AttachmentValidation {
            plan_tier: limits.plan_tier,
            accepted_files: files.len(),
            daily_used,
            daily_limit: attachment_limits.daily_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_fixtures::account;
    use crates::domain::{
        entities::users::UserEntity,
        repositories::{
            attachments::MockAttachmentUsageRepository, plan_accounts::MockPlanAccountRepository,
        },
        value_objects::{attachments::AttachmentViolationCode, enums::plan_tiers::PlanTier},
    };

    fn accounts_with(user: UserEntity) -> MockPlanAccountRepository {
        let mut account_repo = MockPlanAccountRepository::new();
        account_repo.expect_find_by_id().returning(move |_| {
            let user = user.clone();
            Box::pin(async move { Ok(Some(user)) })
        });
        account_repo
    }

    fn pdf() -> AttachmentFileMeta {
        AttachmentFileMeta {
            file_name: "contrato.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size_bytes: 200 * 1024,
        }
    }

    #[tokio::test]
    async fn free_user_needs_a_plan() {
        let user_id = Uuid::new_v4();
        let mut usage_repo = MockAttachmentUsageRepository::new();
        usage_repo.expect_count_user_attachments_since().never();

        let usecase = AttachmentUseCase::new(
            Arc::new(accounts_with(account(user_id, PlanTier::Free, None))),
            Arc::new(usage_repo),
        );

        let err = usecase.validate(user_id, vec![pdf()]).await.unwrap_err();
        match err {
            UseCaseError::Attachment(violation) => {
                assert_eq!(violation.code, AttachmentViolationCode::PlanRequired)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn daily_quota_is_enforced() {
        let user_id = Uuid::new_v4();
        let mut usage_repo = MockAttachmentUsageRepository::new();
        usage_repo
            .expect_count_user_attachments_since()
            .returning(|_, _| Box::pin(async { Ok(20) }));

        let usecase = AttachmentUseCase::new(
            Arc::new(accounts_with(account(user_id, PlanTier::Pro, None))),
            Arc::new(usage_repo),
        );

        let err = usecase.validate(user_id, vec![pdf()]).await.unwrap_err();
        match err {
            UseCaseError::Attachment(violation) => {
                assert_eq!(violation.code, AttachmentViolationCode::DailyQuota)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn paid_user_within_limits_is_accepted() {
        let user_id = Uuid::new_v4();
        let mut usage_repo = MockAttachmentUsageRepository::new();
        usage_repo
            .expect_count_user_attachments_since()
            .returning(|_, _| Box::pin(async { Ok(4) }));

        let usecase = AttachmentUseCase::new(
            Arc::new(accounts_with(account(user_id, PlanTier::Premium, None))),
            Arc::new(usage_repo),
        );

        let validation = usecase.validate(user_id, vec![pdf(), pdf()]).await.unwrap();
        assert_eq!(validation.accepted_files, 2);
        assert_eq!(validation.daily_limit, 200);
    }
}
