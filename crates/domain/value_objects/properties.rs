use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::properties::PropertyEntity,
    value_objects::enums::{
        deactivation_reasons::DeactivationReason, property_statuses::PropertyStatus,
    },
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PropertyLifecycleDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub status: PropertyStatus,
    pub is_active: bool,
    pub is_featured: bool,
    pub deactivated_reason: Option<DeactivationReason>,
    pub deactivated_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<PropertyEntity> for PropertyLifecycleDto {
    fn from(value: PropertyEntity) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            status: value.status(),
            deactivated_reason: value.deactivation_reason(),
            title: value.title,
            is_active: value.is_active,
            is_featured: value.is_featured,
            deactivated_at: value.deactivated_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: PropertyStatus,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BulkAction {
    Archive,
    UpdateStatus,
    ToggleFeatured,
    Publish,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkActionRequest {
    pub action: BulkAction,
    pub property_ids: Vec<Uuid>,
    pub status: Option<PropertyStatus>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BulkItemResult {
    pub id: Uuid,
    pub ok: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct BulkActionResult {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<String>,
    pub processed: Vec<BulkItemResult>,
}

impl BulkActionResult {
    pub fn record_success(&mut self, id: Uuid) {
        self.success += 1;
        self.processed.push(BulkItemResult {
            id,
            ok: true,
            error: None,
        });
    }

    pub fn record_failure(&mut self, id: Uuid, error: String) {
        self.failed += 1;
        self.errors.push(format!("{id}: {error}"));
        self.processed.push(BulkItemResult {
            id,
            ok: false,
            error: Some(error),
        });
    }
}
