use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Months, Utc};
use crates::domain::{
    entities::users::UserEntity,
    repositories::plan_accounts::PlanAccountRepository,
    value_objects::{
        enums::plan_tiers::PlanTier,
        plan_enforcement::{PlanChange, PlanChangeOutcome},
        plans::{PlanQuote, quote_plan},
    },
};
use tracing::{error, info};
use uuid::Uuid;

use super::{
    errors::{UseCaseError, UseCaseResult},
    plan_limits::load_account,
};
use crate::config::config_model::Founder;

pub const MAX_PLAN_MONTHS: u32 = 36;

fn validate_months(months: Option<u32>) -> UseCaseResult<u32> {
    let months = months.unwrap_or(1);
    if !(1..=MAX_PLAN_MONTHS).contains(&months) {
        return Err(UseCaseError::BadRequest(format!(
            "months must be between 1 and {MAX_PLAN_MONTHS}"
        )));
    }
    Ok(months)
}

/// Start and end of a paid period. Renewing the same, still running tier extends it.
fn plan_period(
    account: &UserEntity,
    tier: PlanTier,
    months: u32,
    now: DateTime<Utc>,
) -> UseCaseResult<(DateTime<Utc>, DateTime<Utc>)> {
    let renewal = account.stored_tier() == tier && !account.is_plan_expired(now);

    let (start, from) = match (renewal, account.plan_end_date) {
        (true, Some(end)) => (account.plan_start_date.unwrap_or(now), end.max(now)),
        _ => (now, now),
    };

    let end = from
        .checked_add_months(Months::new(months))
        .ok_or_else(|| UseCaseError::Internal(anyhow!("plan end date overflow")))?;

    Ok((start, end))
}

pub struct PlanChangeUseCase<U>
where
    U: PlanAccountRepository + Send + Sync + 'static,
{
    account_repo: Arc<U>,
    founder: Founder,
}

impl<U> PlanChangeUseCase<U>
where
    U: PlanAccountRepository + Send + Sync + 'static,
{
    pub fn new(account_repo: Arc<U>, founder: Founder) -> Self {
        Self {
            account_repo,
            founder,
        }
    }

    pub async fn change_plan(
        &self,
        user_id: Uuid,
        tier: PlanTier,
        months: Option<u32>,
    ) -> UseCaseResult<PlanChangeOutcome> {
        let now = Utc::now();
        let account = load_account(self.account_repo.as_ref(), user_id).await?;

        let (plan_start_date, plan_end_date) = if tier.is_paid() {
            let months = validate_months(months)?;
            let (start, end) = plan_period(&account, tier, months, now)?;
            (Some(start), Some(end))
        } else {
            (None, None)
        };

        self.apply(account, tier, plan_start_date, plan_end_date, now)
            .await
    }

    pub async fn grant_founder(
        &self,
        user_id: Uuid,
        discount_percent: Option<i32>,
    ) -> UseCaseResult<PlanChangeOutcome> {
        let now = Utc::now();
        let discount = discount_percent.unwrap_or(self.founder.default_discount_percent);
        if !(0..=100).contains(&discount) {
            return Err(UseCaseError::BadRequest(
                "discount_percent must be between 0 and 100".to_string(),
            ));
        }

        let account = load_account(self.account_repo.as_ref(), user_id).await?;

        self.account_repo
            .set_founder(user_id, discount, now)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "plan_changes: failed to mark founder");
                UseCaseError::Internal(err)
            })?;

        info!(%user_id, discount, "plan_changes: founder status granted");

        if account.effective_tier(now).is_paid() {
            let tier = account.stored_tier();
            return Ok(PlanChangeOutcome {
                user_id,
                old_tier: tier,
                new_tier: tier,
                plan_start_date: account.plan_start_date,
                plan_end_date: account.plan_end_date,
                deactivated_ids: Vec::new(),
                reactivated_ids: Vec::new(),
            });
        }

        let offer_end = now
            .checked_add_months(Months::new(self.founder.offer_months))
            .ok_or_else(|| UseCaseError::Internal(anyhow!("founder offer end date overflow")))?;

        self.apply(
            account,
            self.founder.offer_tier,
            Some(now),
            Some(offer_end),
            now,
        )
        .await
    }

    pub async fn quote(
        &self,
        user_id: Uuid,
        tier: PlanTier,
        months: Option<u32>,
    ) -> UseCaseResult<PlanQuote> {
        let months = validate_months(months)?;
        let account = load_account(self.account_repo.as_ref(), user_id).await?;

        Ok(quote_plan(tier, months, account.founder_discount_percent()))
    }

    async fn apply(
        &self,
        account: UserEntity,
        tier: PlanTier,
        plan_start_date: Option<DateTime<Utc>>,
        plan_end_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> UseCaseResult<PlanChangeOutcome> {
        let user_id = account.id;
        let old_tier = account.stored_tier();

        let applied = self
            .account_repo
            .apply_plan_change(PlanChange {
                user_id,
                tier,
                plan_start_date,
                plan_end_date,
                at: now,
            })
            .await
            .map_err(|err| {
                error!(%user_id, tier = %tier, db_error = ?err, "plan_changes: failed to apply plan change");
                UseCaseError::Internal(err)
            })?;

        info!(
            %user_id,
            old_tier = %old_tier,
            new_tier = %tier,
            deactivated = applied.deactivated_ids.len(),
            reactivated = applied.reactivated_ids.len(),
            "plan_changes: plan changed"
        );

        Ok(PlanChangeOutcome {
            user_id,
            old_tier,
            new_tier: tier,
            plan_start_date,
            plan_end_date,
            deactivated_ids: applied.deactivated_ids,
            reactivated_ids: applied.reactivated_ids,
        })
    }
}
