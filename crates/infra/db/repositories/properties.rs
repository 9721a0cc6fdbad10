use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, dsl::count_star, prelude::*, update};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        entities::properties::{PropertyActivationChangeset, PropertyEntity},
        repositories::properties::PropertyLifecycleRepository,
        value_objects::enums::{
            deactivation_reasons::DeactivationReason, property_statuses::PropertyStatus,
        },
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{properties, users},
    },
};

pub struct PropertyLifecyclePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PropertyLifecyclePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PropertyLifecycleRepository for PropertyLifecyclePostgres {
    async fn find_by_id(&self, property_id: Uuid) -> Result<Option<PropertyEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<PropertyEntity>> {
            let mut conn = db_pool.get()?;

            let result = properties::table
                .find(property_id)
                .select(PropertyEntity::as_select())
                .first::<PropertyEntity>(&mut conn)
                .optional()?;

            Ok(result)
        })
        .await??)
    }

    async fn find_by_ids(&self, property_ids: Vec<Uuid>) -> Result<Vec<PropertyEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<PropertyEntity>> {
            let mut conn = db_pool.get()?;

            let result = properties::table
                .filter(properties::id.eq_any(property_ids))
                .select(PropertyEntity::as_select())
                .load::<PropertyEntity>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }

    async fn list_active_by_owner(&self, user_id: Uuid) -> Result<Vec<PropertyEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<PropertyEntity>> {
            let mut conn = db_pool.get()?;

            let result = properties::table
                .filter(properties::user_id.eq(user_id))
                .filter(properties::is_active.eq(true))
                .select(PropertyEntity::as_select())
                .order(properties::created_at.desc())
                .load::<PropertyEntity>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }

    async fn count_active_by_owner(&self, user_id: Uuid) -> Result<i64> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<i64> {
            let mut conn = db_pool.get()?;

            let result = properties::table
                .filter(properties::user_id.eq(user_id))
                .filter(properties::is_active.eq(true))
                .count()
                .get_result::<i64>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }

    async fn activate_within_limit(
        &self,
        property_id: Uuid,
        max_active: Option<i64>,
        status: Option<PropertyStatus>,
        at: DateTime<Utc>,
    ) -> Result<Option<PropertyEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<PropertyEntity>> {
            let mut conn = db_pool.get()?;

            conn.transaction::<Option<PropertyEntity>, anyhow::Error, _>(|tx| {
                let owner_id = properties::table
                    .find(property_id)
                    .select(properties::user_id)
                    .first::<Uuid>(tx)
                    .optional()?
                    .ok_or_else(|| anyhow!("property {property_id} not found"))?;

                // Same account lock the plan changes take, so the count below cannot go stale.
                users::table
                    .find(owner_id)
                    .select(users::id)
                    .for_update()
                    .first::<Uuid>(tx)?;

                let active_count = properties::table
                    .filter(properties::user_id.eq(owner_id))
                    .filter(properties::is_active.eq(true))
                    .count()
                    .get_result::<i64>(tx)?;

                if max_active.is_some_and(|max| active_count >= max) {
                    return Ok(None);
                }

                let updated = update(properties::table.find(property_id))
                    .set(&PropertyActivationChangeset::activate(status, at))
                    .returning(PropertyEntity::as_returning())
                    .get_result::<PropertyEntity>(tx)?;

                Ok(Some(updated))
            })
        })
        .await??)
    }

    async fn deactivate(
        &self,
        property_id: Uuid,
        reason: DeactivationReason,
        status: Option<PropertyStatus>,
        at: DateTime<Utc>,
    ) -> Result<PropertyEntity> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<PropertyEntity> {
            let mut conn = db_pool.get()?;

            let updated = update(properties::table.find(property_id))
                .set(&PropertyActivationChangeset::deactivate(reason, status, at))
                .returning(PropertyEntity::as_returning())
                .get_result::<PropertyEntity>(&mut conn)?;

            Ok(updated)
        })
        .await??)
    }

    async fn update_status(
        &self,
        property_id: Uuid,
        status: PropertyStatus,
        at: DateTime<Utc>,
    ) -> Result<PropertyEntity> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<PropertyEntity> {
            let mut conn = db_pool.get()?;

            let updated = update(properties::table.find(property_id))
                .set((
                    properties::status.eq(status.to_string()),
                    properties::updated_at.eq(at),
                ))
                .returning(PropertyEntity::as_returning())
                .get_result::<PropertyEntity>(&mut conn)?;

            Ok(updated)
        })
        .await??)
    }

    async fn set_featured(
        &self,
        property_id: Uuid,
        featured: bool,
        at: DateTime<Utc>,
    ) -> Result<PropertyEntity> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<PropertyEntity> {
            let mut conn = db_pool.get()?;

            // `featured_at` is kept when unfeaturing so the monthly quota still counts it.
            let updated = if featured {
                update(properties::table.find(property_id))
                    .set((
                        properties::is_featured.eq(true),
                        properties::featured_at.eq(Some(at)),
                        properties::updated_at.eq(at),
                    ))
                    .returning(PropertyEntity::as_returning())
                    .get_result::<PropertyEntity>(&mut conn)?
            } else {
                update(properties::table.find(property_id))
                    .set((
                        properties::is_featured.eq(false),
                        properties::updated_at.eq(at),
                    ))
                    .returning(PropertyEntity::as_returning())
                    .get_result::<PropertyEntity>(&mut conn)?
            };

            Ok(updated)
        })
        .await??)
    }

    async fn count_featured_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<i64> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<i64> {
            let mut conn = db_pool.get()?;

            let result = properties::table
                .filter(properties::user_id.eq(user_id))
                .filter(properties::featured_at.ge(since))
                .count()
                .get_result::<i64>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }

    async fn count_by_activity(&self) -> Result<(i64, i64)> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<(i64, i64)> {
            let mut conn = db_pool.get()?;

            let rows = properties::table
                .group_by(properties::is_active)
                .select((properties::is_active, count_star()))
                .load::<(bool, i64)>(&mut conn)?;

            let (active, inactive) =
                rows.into_iter()
                    .fold((0, 0), |(active, inactive), (is_active, count)| {
                        if is_active {
                            (active + count, inactive)
                        } else {
                            (active, inactive + count)
                        }
                    });

            Ok((active, inactive))
        })
        .await??)
    }
}
