use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::users::UserEntity,
    value_objects::plan_enforcement::{PlanChange, PlanChangeApplied},
};

/// Plan bookkeeping on accounts. Every method that touches listings runs in a
/// single transaction holding the account row lock.
#[async_trait]
#[automock]
pub trait PlanAccountRepository {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>>;

    /// Downgrades an expired paid plan to free and deactivates the listings
    /// beyond `keep_active`. Returns `None` when the account was no longer on
    /// an expired paid plan, in which case nothing is written.
    async fn expire_plan(
        &self,
        user_id: Uuid,
        keep_active: Option<i64>,
        at: DateTime<Utc>,
    ) -> Result<Option<Vec<Uuid>>>;

    async fn apply_plan_change(&self, change: PlanChange) -> Result<PlanChangeApplied>;

    /// Reactivates auto-deactivated listings while the active count stays within `max_active`.
    async fn reactivate_within_limit(
        &self,
        user_id: Uuid,
        max_active: Option<i64>,
        at: DateTime<Utc>,
    ) -> Result<Vec<Uuid>>;

    async fn set_founder(
        &self,
        user_id: Uuid,
        discount_percent: i32,
        at: DateTime<Utc>,
    ) -> Result<()>;

    /// Expired paid accounts ordered by id, starting after the `after` cursor.
    async fn list_expired_user_ids(
        &self,
        now: DateTime<Utc>,
        after: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<Uuid>>;

    async fn count_expired_paid(&self, now: DateTime<Utc>) -> Result<i64>;

    async fn count_users_by_tier(&self) -> Result<Vec<(Option<String>, i64)>>;

    async fn count_founders(&self) -> Result<i64>;
}
