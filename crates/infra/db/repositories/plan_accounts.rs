use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, dsl::count_star, prelude::*, update};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            properties::{PropertyActivationChangeset, PropertyEntity},
            users::UserEntity,
        },
        repositories::plan_accounts::PlanAccountRepository,
        value_objects::{
            enums::{
                deactivation_reasons::DeactivationReason, plan_tiers::PlanTier,
                property_statuses::PropertyStatus,
            },
            plan_enforcement::{
                PlanChange, PlanChangeApplied, select_excess_active, select_for_reactivation,
            },
            plans::PlanLimits,
        },
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{properties, users},
    },
};

pub struct PlanAccountPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PlanAccountPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

/// Row lock on the account. Serialises every change to a user's plan and listing quota.
fn lock_account(conn: &mut PgConnection, user_id: Uuid) -> QueryResult<Option<UserEntity>> {
    users::table
        .find(user_id)
        .select(UserEntity::as_select())
        .for_update()
        .first::<UserEntity>(conn)
        .optional()
}

fn load_active_for_update(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> QueryResult<Vec<PropertyEntity>> {
    properties::table
        .filter(properties::user_id.eq(user_id))
        .filter(properties::is_active.eq(true))
        .select(PropertyEntity::as_select())
        .for_update()
        .load::<PropertyEntity>(conn)
}

fn load_reactivation_candidates(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> QueryResult<Vec<PropertyEntity>> {
    let automatic: Vec<String> = DeactivationReason::AUTOMATIC
        .iter()
        .map(|reason| reason.to_string())
        .collect();

    properties::table
        .filter(properties::user_id.eq(user_id))
        .filter(properties::is_active.eq(false))
        .filter(properties::status.ne(PropertyStatus::Suspended.to_string()))
        .filter(properties::deactivated_reason.eq_any(automatic))
        .select(PropertyEntity::as_select())
        .for_update()
        .load::<PropertyEntity>(conn)
}

fn apply_changeset(
    conn: &mut PgConnection,
    property_ids: &[Uuid],
    changeset: &PropertyActivationChangeset,
) -> QueryResult<usize> {
    if property_ids.is_empty() {
        return Ok(0);
    }

    update(properties::table.filter(properties::id.eq_any(property_ids.to_vec())))
        .set(changeset)
        .execute(conn)
}

fn reactivate_up_to(
    conn: &mut PgConnection,
    user_id: Uuid,
    max_active: Option<i64>,
    active_count: usize,
    at: DateTime<Utc>,
) -> QueryResult<Vec<Uuid>> {
    let active_count = i64::try_from(active_count).unwrap_or(i64::MAX);
    let slots = max_active.map(|max| (max - active_count).max(0));
    if slots == Some(0) {
        return Ok(Vec::new());
    }

    let candidates = load_reactivation_candidates(conn, user_id)?;
    let chosen = select_for_reactivation(&candidates, slots);
    apply_changeset(conn, &chosen, &PropertyActivationChangeset::activate(None, at))?;

    Ok(chosen)
}

#[async_trait]
impl PlanAccountRepository for PlanAccountPostgres {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<UserEntity>> {
            let mut conn = db_pool.get()?;

            let result = users::table
                .find(user_id)
                .select(UserEntity::as_select())
                .first::<UserEntity>(&mut conn)
                .optional()?;

            Ok(result)
        })
        .await??)
    }

    async fn expire_plan(
        &self,
        user_id: Uuid,
        keep_active: Option<i64>,
        at: DateTime<Utc>,
    ) -> Result<Option<Vec<Uuid>>> {
        let db_pool = Arc::clone(&self.db_pool);
        let paid_tiers = PlanTier::paid_db_values();

        Ok(task::spawn_blocking(move || -> Result<Option<Vec<Uuid>>> {
            let mut conn = db_pool.get()?;

            conn.transaction::<Option<Vec<Uuid>>, anyhow::Error, _>(|tx| {
                if lock_account(tx, user_id)?.is_none() {
                    return Ok(None);
                }

                // Guarded so a concurrent run that already downgraded the account is a no-op.
                let downgraded = update(
                    users::table
                        .filter(users::id.eq(user_id))
                        .filter(users::plan_tier.eq_any(paid_tiers))
                        .filter(users::plan_end_date.le(at)),
                )
                .set((
                    users::plan_tier.eq(Some(PlanTier::Free.to_string())),
                    users::updated_at.eq(at),
                ))
                .execute(tx)?;

                if downgraded == 0 {
                    return Ok(None);
                }

                let active = load_active_for_update(tx, user_id)?;
                let excess = select_excess_active(&active, keep_active);
                apply_changeset(
                    tx,
                    &excess,
                    &PropertyActivationChangeset::deactivate(
                        DeactivationReason::PlanExpired,
                        None,
                        at,
                    ),
                )?;

                Ok(Some(excess))
            })
        })
        .await??)
    }

    async fn apply_plan_change(&self, change: PlanChange) -> Result<PlanChangeApplied> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<PlanChangeApplied> {
            let mut conn = db_pool.get()?;

            conn.transaction::<PlanChangeApplied, anyhow::Error, _>(|tx| {
                lock_account(tx, change.user_id)?
                    .ok_or_else(|| anyhow!("user {} not found", change.user_id))?;

                update(users::table.filter(users::id.eq(change.user_id)))
                    .set((
                        users::plan_tier.eq(Some(change.tier.to_string())),
                        users::plan_start_date.eq(change.plan_start_date),
                        users::plan_end_date.eq(change.plan_end_date),
                        users::updated_at.eq(change.at),
                    ))
                    .execute(tx)?;

                let max_active = PlanLimits::for_tier(change.tier).max_active_properties;
                let active = load_active_for_update(tx, change.user_id)?;
                let excess = select_excess_active(&active, max_active);

                if !excess.is_empty() {
                    apply_changeset(
                        tx,
                        &excess,
                        &PropertyActivationChangeset::deactivate(
                            DeactivationReason::PlanDowngrade,
                            None,
                            change.at,
                        ),
                    )?;

                    return Ok(PlanChangeApplied {
                        deactivated_ids: excess,
                        reactivated_ids: Vec::new(),
                    });
                }

                let reactivated_ids =
                    reactivate_up_to(tx, change.user_id, max_active, active.len(), change.at)?;

                Ok(PlanChangeApplied {
                    deactivated_ids: Vec::new(),
                    reactivated_ids,
                })
            })
        })
        .await??)
    }

    async fn reactivate_within_limit(
        &self,
        user_id: Uuid,
        max_active: Option<i64>,
        at: DateTime<Utc>,
    ) -> Result<Vec<Uuid>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<Uuid>> {
            let mut conn = db_pool.get()?;

            conn.transaction::<Vec<Uuid>, anyhow::Error, _>(|tx| {
                lock_account(tx, user_id)?.ok_or_else(|| anyhow!("user {user_id} not found"))?;

                let active = load_active_for_update(tx, user_id)?;
                Ok(reactivate_up_to(tx, user_id, max_active, active.len(), at)?)
            })
        })
        .await??)
    }

    async fn set_founder(
        &self,
        user_id: Uuid,
        discount_percent: i32,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<()> {
            let mut conn = db_pool.get()?;

            update(users::table.filter(users::id.eq(user_id)))
                .set((
                    users::is_founder.eq(true),
                    users::founder_discount.eq(Some(discount_percent)),
                    users::updated_at.eq(at),
                ))
                .execute(&mut conn)?;

            Ok(())
        })
        .await??)
    }

    async fn list_expired_user_ids(
        &self,
        now: DateTime<Utc>,
        after: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<Uuid>> {
        let db_pool = Arc::clone(&self.db_pool);
        let paid_tiers = PlanTier::paid_db_values();

        Ok(task::spawn_blocking(move || -> Result<Vec<Uuid>> {
            let mut conn = db_pool.get()?;

            let mut query = users::table
                .filter(users::plan_tier.eq_any(paid_tiers))
                .filter(users::plan_end_date.le(now))
                .into_boxed();
            if let Some(after) = after {
                query = query.filter(users::id.gt(after));
            }

            let result = query
                .order(users::id.asc())
                .select(users::id)
                .limit(limit)
                .load::<Uuid>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }

    async fn count_expired_paid(&self, now: DateTime<Utc>) -> Result<i64> {
        let db_pool = Arc::clone(&self.db_pool);
        let paid_tiers = PlanTier::paid_db_values();

        Ok(task::spawn_blocking(move || -> Result<i64> {
            let mut conn = db_pool.get()?;

            let result = users::table
                .filter(users::plan_tier.eq_any(paid_tiers))
                .filter(users::plan_end_date.le(now))
                .count()
                .get_result::<i64>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }

    async fn count_users_by_tier(&self) -> Result<Vec<(Option<String>, i64)>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<(Option<String>, i64)>> {
            let mut conn = db_pool.get()?;

            let result = users::table
                .group_by(users::plan_tier)
                .select((users::plan_tier, count_star()))
                .load::<(Option<String>, i64)>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }

    async fn count_founders(&self) -> Result<i64> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<i64> {
            let mut conn = db_pool.get()?;

            let result = users::table
                .filter(users::is_founder.eq(true))
                .count()
                .get_result::<i64>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }
}
