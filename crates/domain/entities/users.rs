use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::enums::plan_tiers::PlanTier, infra::db::postgres::schema::users,
};

/// Account row with the plan bookkeeping columns.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = users)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: Option<String>,
    pub company_name: Option<String>,
    pub plan_tier: Option<String>,
    pub is_founder: bool,
    pub founder_discount: Option<i32>,
    pub plan_start_date: Option<DateTime<Utc>>,
    pub plan_end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserEntity {
    pub fn stored_tier(&self) -> PlanTier {
        PlanTier::from_db(self.plan_tier.as_deref())
    }

    /// A paid plan whose end date has passed. Paid plans without an end date never expire.
    pub fn is_plan_expired(&self, now: DateTime<Utc>) -> bool {
        self.stored_tier().is_paid() && self.plan_end_date.is_some_and(|end| end <= now)
    }

    pub fn is_plan_active(&self, now: DateTime<Utc>) -> bool {
        self.plan_end_date.is_none_or(|end| end > now)
    }

    /// Tier used for entitlement checks: an expired paid plan counts as free.
    pub fn effective_tier(&self, now: DateTime<Utc>) -> PlanTier {
        if self.is_plan_expired(now) {
            PlanTier::Free
        } else {
            self.stored_tier()
        }
    }

    /// Whole days left on the plan, rounded up. Negative once the end date has passed.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        const DAY_SECONDS: i64 = 86_400;

        self.plan_end_date.map(|end| {
            let seconds = (end - now).num_seconds();
            if seconds > 0 {
                (seconds + DAY_SECONDS - 1) / DAY_SECONDS
            } else {
                seconds / DAY_SECONDS
            }
        })
    }

    pub fn founder_discount_percent(&self) -> Option<i32> {
        if self.is_founder {
            self.founder_discount
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(tier: PlanTier, plan_end_date: Option<DateTime<Utc>>) -> UserEntity {
        let now = Utc::now();
        UserEntity {
            id: Uuid::new_v4(),
            email: Some("agency@example.com".to_string()),
            company_name: Some("Inmobiliaria Norte".to_string()),
            plan_tier: Some(tier.to_string()),
            is_founder: false,
            founder_discount: None,
            plan_start_date: plan_end_date.map(|_| now - Duration::days(30)),
            plan_end_date,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn expired_paid_plan_is_effectively_free() {
        let now = Utc::now();
        let account = user(PlanTier::Professional, Some(now - Duration::days(1)));

        assert!(account.is_plan_expired(now));
        assert_eq!(account.effective_tier(now), PlanTier::Free);
        assert_eq!(account.stored_tier(), PlanTier::Professional);
    }

    #[test]
    fn paid_plan_without_end_date_never_expires() {
        let now = Utc::now();
        let account = user(PlanTier::Premium, None);

        assert!(!account.is_plan_expired(now));
        assert!(account.is_plan_active(now));
        assert_eq!(account.effective_tier(now), PlanTier::Premium);
    }

    #[test]
    fn non_canonical_tier_is_not_treated_as_an_expired_paid_plan() {
        let now = Utc::now();
        let mut account = user(PlanTier::Professional, Some(now - Duration::days(1)));
        account.plan_tier = Some("Professional".to_string());

        assert!(!account.is_plan_expired(now));
        assert_eq!(account.effective_tier(now), PlanTier::Free);
    }

    #[test]
    fn free_plan_is_never_expired() {
        let now = Utc::now();
        let account = user(PlanTier::Free, Some(now - Duration::days(10)));
        assert!(!account.is_plan_expired(now));
    }

    #[test]
    fn days_remaining_rounds_up() {
        let now = Utc::now();
        let account = user(PlanTier::Pro, Some(now + Duration::hours(25)));
        assert_eq!(account.days_remaining(now), Some(2));

        let lapsed = user(PlanTier::Pro, Some(now - Duration::hours(36)));
        assert_eq!(lapsed.days_remaining(now), Some(-1));
    }

    #[test]
    fn discount_only_applies_to_founders() {
        let mut account = user(PlanTier::Free, None);
        account.founder_discount = Some(50);
        assert_eq!(account.founder_discount_percent(), None);

        account.is_founder = true;
        assert_eq!(account.founder_discount_percent(), Some(50));
    }
}
