use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, dsl::exists, insert_into, prelude::*, select, update};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            properties::PropertyActivationChangeset,
            property_reports::{InsertPropertyReportEntity, PropertyReportEntity},
        },
        repositories::property_reports::PropertyReportRepository,
        value_objects::enums::{
            deactivation_reasons::DeactivationReason, property_statuses::PropertyStatus,
            report_statuses::ReportStatus,
        },
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{properties, property_reports},
    },
};

pub struct PropertyReportPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PropertyReportPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PropertyReportRepository for PropertyReportPostgres {
    async fn exists_by_reporter(&self, property_id: Uuid, reporter_id: Uuid) -> Result<bool> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<bool> {
            let mut conn = db_pool.get()?;

            let result = select(exists(
                property_reports::table
                    .filter(property_reports::property_id.eq(property_id))
                    .filter(property_reports::reporter_id.eq(reporter_id)),
            ))
            .get_result::<bool>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }

    async fn insert(&self, report: InsertPropertyReportEntity) -> Result<Option<Uuid>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<Uuid>> {
            let mut conn = db_pool.get()?;

            // A concurrent report by the same reporter yields no row.
            let report_id = insert_into(property_reports::table)
                .values(&report)
                .on_conflict((property_reports::property_id, property_reports::reporter_id))
                .do_nothing()
                .returning(property_reports::id)
                .get_result::<Uuid>(&mut conn)
                .optional()?;

            Ok(report_id)
        })
        .await??)
    }

    async fn count_by_property(&self, property_id: Uuid) -> Result<i64> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<i64> {
            let mut conn = db_pool.get()?;

            let result = property_reports::table
                .filter(property_reports::property_id.eq(property_id))
                .count()
                .get_result::<i64>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }

    async fn suspend_property(
        &self,
        property_id: Uuid,
        resolve_pending: bool,
        at: DateTime<Utc>,
    ) -> Result<usize> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            conn.transaction::<usize, anyhow::Error, _>(|tx| {
                update(properties::table.find(property_id))
                    .set(&PropertyActivationChangeset::deactivate(
                        DeactivationReason::Reported,
                        Some(PropertyStatus::Suspended),
                        at,
                    ))
                    .execute(tx)?;

                if !resolve_pending {
                    return Ok(0);
                }

                let resolved = update(
                    property_reports::table
                        .filter(property_reports::property_id.eq(property_id))
                        .filter(property_reports::status.eq(ReportStatus::Pending.to_string())),
                )
                .set((
                    property_reports::status.eq(ReportStatus::Resolved.to_string()),
                    property_reports::updated_at.eq(at),
                ))
                .execute(tx)?;

                Ok(resolved)
            })
        })
        .await??)
    }

    async fn find_by_id(&self, report_id: Uuid) -> Result<Option<PropertyReportEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<PropertyReportEntity>> {
            let mut conn = db_pool.get()?;

            let result = property_reports::table
                .find(report_id)
                .select(PropertyReportEntity::as_select())
                .first::<PropertyReportEntity>(&mut conn)
                .optional()?;

            Ok(result)
        })
        .await??)
    }

    async fn set_status(
        &self,
        report_id: Uuid,
        status: ReportStatus,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<()> {
            let mut conn = db_pool.get()?;

            update(property_reports::table.find(report_id))
                .set((
                    property_reports::status.eq(status.to_string()),
                    property_reports::updated_at.eq(at),
                ))
                .execute(&mut conn)?;

            Ok(())
        })
        .await??)
    }

    async fn count_pending(&self) -> Result<i64> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<i64> {
            let mut conn = db_pool.get()?;

            let result = property_reports::table
                .filter(property_reports::status.eq(ReportStatus::Pending.to_string()))
                .count()
                .get_result::<i64>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }
}
