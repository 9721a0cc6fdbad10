use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::enums::{
        deactivation_reasons::DeactivationReason, property_statuses::PropertyStatus,
    },
    infra::db::postgres::schema::properties,
};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = properties)]
pub struct PropertyEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub status: String,
    pub is_active: bool,
    pub is_featured: bool,
    pub featured_at: Option<DateTime<Utc>>,
    pub deactivated_reason: Option<String>,
    pub deactivated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PropertyEntity {
    pub fn status(&self) -> PropertyStatus {
        self.status.parse().unwrap_or_default()
    }

    pub fn deactivation_reason(&self) -> Option<DeactivationReason> {
        self.deactivated_reason
            .as_deref()
            .and_then(|reason| reason.parse().ok())
    }

    pub fn is_suspended(&self) -> bool {
        self.status() == PropertyStatus::Suspended
    }
}

/// Column changes applied when a listing moves between active and inactive.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = properties)]
pub struct PropertyActivationChangeset {
    pub is_active: bool,
    pub status: Option<String>,
    pub deactivated_reason: Option<Option<String>>,
    pub deactivated_at: Option<Option<DateTime<Utc>>>,
    pub updated_at: DateTime<Utc>,
}

impl PropertyActivationChangeset {
    pub fn activate(status: Option<PropertyStatus>, at: DateTime<Utc>) -> Self {
        Self {
            is_active: true,
            status: status.map(|s| s.to_string()),
            deactivated_reason: Some(None),
            deactivated_at: Some(None),
            updated_at: at,
        }
    }

    pub fn deactivate(
        reason: DeactivationReason,
        status: Option<PropertyStatus>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            is_active: false,
            status: status.map(|s| s.to_string()),
            deactivated_reason: Some(Some(reason.to_string())),
            deactivated_at: Some(Some(at)),
            updated_at: at,
        }
    }
}
