use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::property_reports;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = property_reports)]
pub struct PropertyReportEntity {
    pub id: Uuid,
    pub property_id: Uuid,
    pub reporter_id: Uuid,
    pub reason: String,
    pub details: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = property_reports)]
pub struct InsertPropertyReportEntity {
    pub property_id: Uuid,
    pub reporter_id: Uuid,
    pub reason: String,
    pub details: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
