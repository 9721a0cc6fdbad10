use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::properties::PropertyEntity,
    value_objects::enums::{
        deactivation_reasons::DeactivationReason, property_statuses::PropertyStatus,
    },
};

#[async_trait]
#[automock]
pub trait PropertyLifecycleRepository {
    async fn find_by_id(&self, property_id: Uuid) -> Result<Option<PropertyEntity>>;

    async fn find_by_ids(&self, property_ids: Vec<Uuid>) -> Result<Vec<PropertyEntity>>;

    async fn list_active_by_owner(&self, user_id: Uuid) -> Result<Vec<PropertyEntity>>;

    async fn count_active_by_owner(&self, user_id: Uuid) -> Result<i64>;

    /// Activates the listing unless the owner already has `max_active` active
    /// listings. Returns the updated row, or `None` when the limit was reached.
    async fn activate_within_limit(
        &self,
        property_id: Uuid,
        max_active: Option<i64>,
        status: Option<PropertyStatus>,
        at: DateTime<Utc>,
    ) -> Result<Option<PropertyEntity>>;

    async fn deactivate(
        &self,
        property_id: Uuid,
        reason: DeactivationReason,
        status: Option<PropertyStatus>,
        at: DateTime<Utc>,
    ) -> Result<PropertyEntity>;

    async fn update_status(
        &self,
        property_id: Uuid,
        status: PropertyStatus,
        at: DateTime<Utc>,
    ) -> Result<PropertyEntity>;

    async fn set_featured(
        &self,
        property_id: Uuid,
        featured: bool,
        at: DateTime<Utc>,
    ) -> Result<PropertyEntity>;

    async fn count_featured_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<i64>;

    /// `(active, inactive)` listing counts across all owners.
    async fn count_by_activity(&self) -> Result<(i64, i64)>;
}
