use crate::{
    auth::AuthUser, axum_http::error_responses::{AppError, AppJson},
    usecases::property_reports::PropertyReportUseCase,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use crates::{
    domain::{
        repositories::{
            properties::PropertyLifecycleRepository, property_reports::PropertyReportRepository,
        },
        value_objects::property_reports::{ReportPropertyRequest, ReportPropertyResult},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            properties::PropertyLifecyclePostgres, property_reports::PropertyReportPostgres,
        },
    },
};
use std::sync::Arc;
use uuid::Uuid;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let report_repository = PropertyReportPostgres::new(Arc::clone(&db_pool));
    let property_repository = PropertyLifecyclePostgres::new(Arc::clone(&db_pool));
    let usecase =
        PropertyReportUseCase::new(Arc::new(report_repository), Arc::new(property_repository));

    Router::new()
        .route("/:id/report", post(report_property))
        .with_state(Arc::new(usecase))
}

pub async fn report_property<R, P>(
    State(usecase): State<Arc<PropertyReportUseCase<R, P>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(property_id): Path<Uuid>,
    AppJson(request): AppJson<ReportPropertyRequest>,
) -> Result<Json<ReportPropertyResult>, AppError>
where
    R: PropertyReportRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    Ok(Json(usecase.report(user_id, property_id, request).await?))
}
