use crate::{
    auth::AdminUser,
    axum_http::error_responses::{AppError, AppJson},
    config::config_model::DotEnvyConfig,
    usecases::{
        admin_stats::AdminStatsUseCase, plan_changes::PlanChangeUseCase,
        plan_expiration::PlanExpirationUseCase, plan_reactivation::PlanReactivationUseCase,
        property_reports::PropertyReportUseCase,
    },
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::{
            plan_accounts::PlanAccountRepository, properties::PropertyLifecycleRepository,
            property_reports::PropertyReportRepository,
        },
        value_objects::{
            admin_stats::AdminStatsDto,
            plan_enforcement::{ExpirationOutcome, PlanChangeOutcome, ReactivationOutcome},
            plans::{ChangePlanRequest, GrantFounderRequest, ReactivateRequest},
            property_reports::RemovePropertyResult,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            plan_accounts::PlanAccountPostgres, properties::PropertyLifecyclePostgres,
            property_reports::PropertyReportPostgres,
        },
    },
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct AdminState<U, P, R>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
    R: PropertyReportRepository + Send + Sync + 'static,
{
    changes: PlanChangeUseCase<U>,
    expiration: PlanExpirationUseCase<U, P>,
    reactivation: PlanReactivationUseCase<U, P>,
    reports: PropertyReportUseCase<R, P>,
    stats: AdminStatsUseCase<U, P, R>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let account_repository = Arc::new(PlanAccountPostgres::new(Arc::clone(&db_pool)));
    let property_repository = Arc::new(PropertyLifecyclePostgres::new(Arc::clone(&db_pool)));
    let report_repository = Arc::new(PropertyReportPostgres::new(Arc::clone(&db_pool)));

    let state = AdminState {
        changes: PlanChangeUseCase::new(Arc::clone(&account_repository), config.founder.clone()),
        expiration: PlanExpirationUseCase::new(
            Arc::clone(&account_repository),
            Arc::clone(&property_repository),
        ),
        reactivation: PlanReactivationUseCase::new(
            Arc::clone(&account_repository),
            Arc::clone(&property_repository),
        ),
        reports: PropertyReportUseCase::new(
            Arc::clone(&report_repository),
            Arc::clone(&property_repository),
        ),
        stats: AdminStatsUseCase::new(account_repository, property_repository, report_repository),
    };

    Router::new()
        .route("/users/:id/plan", post(change_plan))
        .route("/users/:id/founder", post(grant_founder))
        .route("/users/:id/check-expiration", post(check_expiration))
        .route("/users/:id/reactivate", post(reactivate))
        .route("/properties/:id/remove", post(remove_property))
        .route("/reports/:id/dismiss", post(dismiss_report))
        .route("/stats", get(stats))
        .with_state(Arc::new(state))
}

pub async fn change_plan<U, P, R>(
    State(state): State<Arc<AdminState<U, P, R>>>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
    AppJson(request): AppJson<ChangePlanRequest>,
) -> Result<Json<PlanChangeOutcome>, AppError>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
    R: PropertyReportRepository + Send + Sync + 'static,
{
    info!(admin_id = %admin.user_id, %user_id, tier = %request.tier, "admin: plan change requested");
    Ok(Json(
        state
            .changes
            .change_plan(user_id, request.tier, request.months)
            .await?,
    ))
}

pub async fn grant_founder<U, P, R>(
    State(state): State<Arc<AdminState<U, P, R>>>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
    AppJson(request): AppJson<GrantFounderRequest>,
) -> Result<Json<PlanChangeOutcome>, AppError>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
    R: PropertyReportRepository + Send + Sync + 'static,
{
    info!(admin_id = %admin.user_id, %user_id, "admin: founder grant requested");
    Ok(Json(
        state
            .changes
            .grant_founder(user_id, request.discount_percent)
            .await?,
    ))
}

pub async fn check_expiration<U, P, R>(
    State(state): State<Arc<AdminState<U, P, R>>>,
    AdminUser(_): AdminUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ExpirationOutcome>, AppError>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
    R: PropertyReportRepository + Send + Sync + 'static,
{
    Ok(Json(state.expiration.check_expiration(user_id).await?))
}

pub async fn reactivate<U, P, R>(
    State(state): State<Arc<AdminState<U, P, R>>>,
    AdminUser(_): AdminUser,
    Path(user_id): Path<Uuid>,
    AppJson(request): AppJson<ReactivateRequest>,
) -> Result<Json<ReactivationOutcome>, AppError>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
    R: PropertyReportRepository + Send + Sync + 'static,
{
    let outcome = match request.max_active_properties {
        Some(max_active) => state.reactivation.reactivate(user_id, Some(max_active)).await?,
        None => state.reactivation.reactivate_for_current_plan(user_id).await?,
    };
    Ok(Json(outcome))
}

pub async fn remove_property<U, P, R>(
    State(state): State<Arc<AdminState<U, P, R>>>,
    AdminUser(admin): AdminUser,
    Path(property_id): Path<Uuid>,
) -> Result<Json<RemovePropertyResult>, AppError>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
    R: PropertyReportRepository + Send + Sync + 'static,
{
    info!(admin_id = %admin.user_id, %property_id, "admin: listing removal requested");
    Ok(Json(state.reports.remove_property(property_id).await?))
}

pub async fn dismiss_report<U, P, R>(
    State(state): State<Arc<AdminState<U, P, R>>>,
    AdminUser(_): AdminUser,
    Path(report_id): Path<Uuid>,
) -> Result<StatusCode, AppError>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
    R: PropertyReportRepository + Send + Sync + 'static,
{
    state.reports.dismiss_report(report_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn stats<U, P, R>(
    State(state): State<Arc<AdminState<U, P, R>>>,
    AdminUser(_): AdminUser,
) -> Result<Json<AdminStatsDto>, AppError>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
    R: PropertyReportRepository + Send + Sync + 'static,
{
    Ok(Json(state.stats.stats().await?))
}
