use std::{collections::HashSet, sync::Arc};

use anyhow::anyhow;
use chrono::{DateTime, Datelike, Utc};
use crates::domain::{
    entities::properties::PropertyEntity,
    repositories::{plan_accounts::PlanAccountRepository, properties::PropertyLifecycleRepository},
    value_objects::{
        enums::{deactivation_reasons::DeactivationReason, property_statuses::PropertyStatus},
        plans::PlanLimits,
        properties::{BulkAction, BulkActionRequest, BulkActionResult, PropertyLifecycleDto},
    },
};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{
    errors::{UseCaseError, UseCaseResult},
    plan_limits::load_account,
};

/// Midnight UTC on the first day of `now`'s month.
pub fn start_of_month(now: DateTime<Utc>) -> UseCaseResult<DateTime<Utc>> {
    now.date_naive()
        .with_day(1)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| UseCaseError::Internal(anyhow!("failed to compute start of month")))
}

pub struct PropertyLifecycleUseCase<U, P>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    account_repo: Arc<U>,
    property_repo: Arc<P>,
}

impl<U, P> PropertyLifecycleUseCase<U, P>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    pub fn new(account_repo: Arc<U>, property_repo: Arc<P>) -> Self {
        Self {
            account_repo,
            property_repo,
        }
    }

    async fn load_owned(&self, owner_id: Uuid, property_id: Uuid) -> UseCaseResult<PropertyEntity> {
        let property = self
            .property_repo
            .find_by_id(property_id)
            .await
            .map_err(|err| {
                error!(%property_id, db_error = ?err, "properties: failed to load listing");
                UseCaseError::Internal(err)
            })?
            .ok_or(UseCaseError::NotFound("property"))?;

        if property.user_id != owner_id {
            warn!(%owner_id, %property_id, "properties: listing not owned by caller");
            return Err(UseCaseError::Forbidden(
                "listing belongs to another user".to_string(),
            ));
        }

        Ok(property)
    }

    async fn effective_limits(&self, owner_id: Uuid) -> UseCaseResult<PlanLimits> {
        let account = load_account(self.account_repo.as_ref(), owner_id).await?;
        Ok(PlanLimits::for_tier(account.effective_tier(Utc::now())))
    }

    pub async fn publish(
        &self,
        owner_id: Uuid,
        property_id: Uuid,
    ) -> UseCaseResult<PropertyLifecycleDto> {
        let property = self.load_owned(owner_id, property_id).await?;

        if property.is_suspended() {
            return Err(UseCaseError::Conflict(
                "suspended listings cannot be published".to_string(),
            ));
        }
        if property.is_active {
            return Ok(property.into());
        }

        let limits = self.effective_limits(owner_id).await?;
        let status =
            (property.status() == PropertyStatus::Expired).then_some(PropertyStatus::Available);

        let activated = self
            .property_repo
            .activate_within_limit(property_id, limits.max_active_properties, status, Utc::now())
            .await
            .map_err(|err| {
                error!(%owner_id, %property_id, db_error = ?err, "properties: failed to publish listing");
                UseCaseError::Internal(err)
            })?;

        match activated {
            Some(property) => {
                info!(%owner_id, %property_id, "properties: listing published");
                Ok(property.into())
            }
            None => {
                let max = limits.max_active_properties.unwrap_or_default();
                info!(%owner_id, %property_id, max, tier = %limits.plan_tier, "properties: publish refused at plan limit");
                Err(UseCaseError::PlanLimitReached(format!(
                    "the {} plan allows {max} active listings",
                    limits.plan_tier
                )))
            }
        }
    }

    pub async fn archive(
        &self,
        owner_id: Uuid,
        property_id: Uuid,
    ) -> UseCaseResult<PropertyLifecycleDto> {
        let property = self.load_owned(owner_id, property_id).await?;

        if property.is_suspended() {
            return Err(UseCaseError::Conflict(
                "suspended listings cannot be archived".to_string(),
            ));
        }
        if !property.is_active && property.status() == PropertyStatus::Expired {
            return Ok(property.into());
        }

        let archived = self
            .property_repo
            .deactivate(
                property_id,
                DeactivationReason::ManualArchive,
                Some(PropertyStatus::Expired),
                Utc::now(),
            )
            .await
            .map_err(|err| {
                error!(%owner_id, %property_id, db_error = ?err, "properties: failed to archive listing");
                UseCaseError::Internal(err)
            })?;

        info!(%owner_id, %property_id, "properties: listing archived");
        Ok(archived.into())
    }

    pub async fn update_status(
        &self,
        owner_id: Uuid,
        property_id: Uuid,
        status: PropertyStatus,
    ) -> UseCaseResult<PropertyLifecycleDto> {
        if !status.is_owner_settable() {
            return Err(UseCaseError::BadRequest(format!(
                "status {status} cannot be set by the owner"
            )));
        }
        if status == PropertyStatus::Expired {
            return self.archive(owner_id, property_id).await;
        }

        let property = self.load_owned(owner_id, property_id).await?;
        if property.is_suspended() {
            return Err(UseCaseError::Conflict(
                "suspended listings cannot change status".to_string(),
            ));
        }

        let updated = self
            .property_repo
            .update_status(property_id, status, Utc::now())
            .await
            .map_err(|err| {
                error!(%owner_id, %property_id, db_error = ?err, "properties: failed to update status");
                UseCaseError::Internal(err)
            })?;

        info!(%owner_id, %property_id, status = %status, "properties: status updated");
        Ok(updated.into())
    }

    pub async fn toggle_featured(
        &self,
        owner_id: Uuid,
        property_id: Uuid,
    ) -> UseCaseResult<PropertyLifecycleDto> {
        let property = self.load_owned(owner_id, property_id).await?;
        let now = Utc::now();

        if !property.is_featured {
            let limits = self.effective_limits(owner_id).await?;
            if !limits.allow_featured {
                return Err(UseCaseError::FeatureNotInPlan("featured listings"));
            }
            if !property.is_active {
                return Err(UseCaseError::Conflict(
                    "only active listings can be featured".to_string(),
                ));
            }

            let used = self
                .property_repo
                .count_featured_since(owner_id, start_of_month(now)?)
                .await
                .map_err(|err| {
                    error!(%owner_id, db_error = ?err, "properties: failed to count featured listings");
                    UseCaseError::Internal(err)
                })?;

            if used >= limits.featured_per_month {
                return Err(UseCaseError::PlanLimitReached(format!(
                    "monthly featured quota of {} used",
                    limits.featured_per_month
                )));
            }
        }

        let updated = self
            .property_repo
            .set_featured(property_id, !property.is_featured, now)
            .await
            .map_err(|err| {
                error!(%owner_id, %property_id, db_error = ?err, "properties: failed to toggle featured");
                UseCaseError::Internal(err)
            })?;

        info!(%owner_id, %property_id, featured = updated.is_featured, "properties: featured toggled");
        Ok(updated.into())
    }

    pub async fn bulk(
        &self,
        owner_id: Uuid,
        request: BulkActionRequest,
    ) -> UseCaseResult<BulkActionResult> {
        if request.property_ids.is_empty() {
            return Err(UseCaseError::BadRequest(
                "property_ids must not be empty".to_string(),
            ));
        }
        let status = match (request.action, request.status) {
            (BulkAction::UpdateStatus, None) => {
                return Err(UseCaseError::BadRequest(
                    "status is required for update-status".to_string(),
                ));
            }
            (_, status) => status,
        };

        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = request
            .property_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();

        let found = self
            .property_repo
            .find_by_ids(ids.clone())
            .await
            .map_err(|err| {
                error!(%owner_id, db_error = ?err, "properties: failed to load bulk listings");
                UseCaseError::Internal(err)
            })?;

        let foreign = found.iter().filter(|p| p.user_id != owner_id).count();
        if foreign > 0 {
            warn!(%owner_id, requested = ids.len(), foreign, "properties: bulk request includes foreign listings");
            return Err(UseCaseError::Forbidden(
                "some listings do not belong to the caller".to_string(),
            ));
        }
        let existing: HashSet<Uuid> = found.iter().map(|p| p.id).collect();

        let mut result = BulkActionResult::default();
        for id in ids {
            if !existing.contains(&id) {
                result.record_failure(id, UseCaseError::NotFound("property").to_string());
                continue;
            }

            let outcome = match request.action {
                BulkAction::Archive => self.archive(owner_id, id).await,
                BulkAction::Publish => self.publish(owner_id, id).await,
                BulkAction::ToggleFeatured => self.toggle_featured(owner_id, id).await,
                BulkAction::UpdateStatus => match status {
                    Some(status) => self.update_status(owner_id, id, status).await,
                    None => Err(UseCaseError::BadRequest("status is required".to_string())),
                },
            };

            match outcome {
                Ok(_) => result.record_success(id),
                Err(UseCaseError::Internal(err)) => {
                    error!(%owner_id, property_id = %id, db_error = ?err, "properties: bulk item failed");
                    result.record_failure(id, "internal error".to_string());
                }
                Err(err) => result.record_failure(id, err.to_string()),
            }
        }

        info!(
            %owner_id,
            action = ?request.action,
            success = result.success,
            failed = result.failed,
            "properties: bulk action applied"
        );

        Ok(result)
    }
}
