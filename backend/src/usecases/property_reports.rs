use std::sync::Arc;

use chrono::Utc;
use crates::domain::{
    entities::property_reports::InsertPropertyReportEntity,
    repositories::{
        properties::PropertyLifecycleRepository, property_reports::PropertyReportRepository,
    },
    value_objects::{
        enums::report_statuses::ReportStatus,
        property_reports::{
            AUTO_SUSPEND_THRESHOLD, RemovePropertyResult, ReportPropertyRequest,
            ReportPropertyResult, validate_report_details,
        },
    },
};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::errors::{UseCaseError, UseCaseResult};

pub struct PropertyReportUseCase<R, P>
where
    R: PropertyReportRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    report_repo: Arc<R>,
    property_repo: Arc<P>,
}

impl<R, P> PropertyReportUseCase<R, P>
where
    R: PropertyReportRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    pub fn new(report_repo: Arc<R>, property_repo: Arc<P>) -> Self {
        Self {
            report_repo,
            property_repo,
        }
    }

    pub async fn report(
        &self,
        reporter_id: Uuid,
        property_id: Uuid,
        request: ReportPropertyRequest,
    ) -> UseCaseResult<ReportPropertyResult> {
        let details = validate_report_details(&request.details).map_err(UseCaseError::BadRequest)?;

        let property = self
            .property_repo
            .find_by_id(property_id)
            .await
            .map_err(|err| {
                error!(%property_id, db_error = ?err, "reports: failed to load listing");
                UseCaseError::Internal(err)
            })?
            .ok_or(UseCaseError::NotFound("property"))?;

        if property.user_id == reporter_id {
            return Err(UseCaseError::BadRequest(
                "you cannot report your own listing".to_string(),
            ));
        }

        let already_reported = self
            .report_repo
            .exists_by_reporter(property_id, reporter_id)
            .await
            .map_err(|err| {
                error!(%property_id, %reporter_id, db_error = ?err, "reports: failed to check duplicate report");
                UseCaseError::Internal(err)
            })?;
        if already_reported {
            return Err(UseCaseError::Conflict(
                "you have already reported this listing".to_string(),
            ));
        }

        let now = Utc::now();
        let report_id = self
            .report_repo
            .insert(InsertPropertyReportEntity {
                property_id,
                reporter_id,
                reason: request.reason.to_string(),
                details,
                status: ReportStatus::Pending.to_string(),
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(%property_id, %reporter_id, db_error = ?err, "reports: failed to insert report");
                UseCaseError::Internal(err)
            })?
            .ok_or_else(|| {
                UseCaseError::Conflict("you have already reported this listing".to_string())
            })?;

        let total_reports = self
            .report_repo
            .count_by_property(property_id)
            .await
            .map_err(|err| {
                error!(%property_id, db_error = ?err, "reports: failed to count reports");
                UseCaseError::Internal(err)
            })?;

        let auto_suspended = total_reports >= AUTO_SUSPEND_THRESHOLD && !property.is_suspended();
        if auto_suspended {
            self.report_repo
                .suspend_property(property_id, false, now)
                .await
                .map_err(|err| {
                    error!(%property_id, db_error = ?err, "reports: failed to auto-suspend listing");
                    UseCaseError::Internal(err)
                })?;
            warn!(%property_id, total_reports, "reports: listing auto-suspended");
        }

        info!(
            %property_id,
            %reporter_id,
            %report_id,
            reason = %request.reason,
            "reports: listing reported"
        );

        Ok(ReportPropertyResult {
            report_id,
            total_reports,
            auto_suspended,
        })
    }

    pub async fn remove_property(&self, property_id: Uuid) -> UseCaseResult<RemovePropertyResult> {
        self.property_repo
            .find_by_id(property_id)
            .await
            .map_err(|err| {
                error!(%property_id, db_error = ?err, "reports: failed to load listing");
                UseCaseError::Internal(err)
            })?
            .ok_or(UseCaseError::NotFound("property"))?;

        let resolved_reports = self
            .report_repo
            .suspend_property(property_id, true, Utc::now())
            .await
            .map_err(|err| {
                error!(%property_id, db_error = ?err, "reports: failed to remove listing");
                UseCaseError::Internal(err)
            })?;

        info!(%property_id, resolved_reports, "reports: listing removed by admin");

        Ok(RemovePropertyResult {
            property_id,
            resolved_reports,
        })
    }

    pub async fn dismiss_report(&self, report_id: Uuid) -> UseCaseResult<()> {
        let report = self
            .report_repo
            .find_by_id(report_id)
            .await
            .map_err(|err| {
                error!(%report_id, db_error = ?err, "reports: failed to load report");
                UseCaseError::Internal(err)
            })?
            .ok_or(UseCaseError::NotFound("report"))?;

        if report.status.parse::<ReportStatus>().ok() != Some(ReportStatus::Pending) {
            return Err(UseCaseError::Conflict(format!(
                "report is already {}",
                report.status
            )));
        }

        self.report_repo
            .set_status(report_id, ReportStatus::Dismissed, Utc::now())
            .await
            .map_err(|err| {
                error!(%report_id, db_error = ?err, "reports: failed to dismiss report");
                UseCaseError::Internal(err)
            })?;

        info!(%report_id, "reports: report dismissed");
        Ok(())
    }
}
