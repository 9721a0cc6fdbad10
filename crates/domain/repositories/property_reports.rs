use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::property_reports::{InsertPropertyReportEntity, PropertyReportEntity},
    value_objects::enums::report_statuses::ReportStatus,
};

#[async_trait]
#[automock]
pub trait PropertyReportRepository {
    async fn exists_by_reporter(&self, property_id: Uuid, reporter_id: Uuid) -> Result<bool>;

    async fn insert(&self, report: InsertPropertyReportEntity) -> Result<Option<Uuid>>;

    async fn count_by_property(&self, property_id: Uuid) -> Result<i64>;

    /// Suspends the listing with reason `reported`. When `resolve_pending` is set the
    /// listing's pending reports are resolved in the same transaction; returns how many.
    async fn suspend_property(
        &self,
        property_id: Uuid,
        resolve_pending: bool,
        at: DateTime<Utc>,
    ) -> Result<usize>;

    async fn find_by_id(&self, report_id: Uuid) -> Result<Option<PropertyReportEntity>>;

    async fn set_status(
        &self,
        report_id: Uuid,
        status: ReportStatus,
        at: DateTime<Utc>,
    ) -> Result<()>;

    async fn count_pending(&self) -> Result<i64>;
}
