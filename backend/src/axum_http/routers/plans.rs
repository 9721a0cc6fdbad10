use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    config::config_model::DotEnvyConfig,
    usecases::{
        plan_changes::PlanChangeUseCase, plan_expiration::PlanExpirationUseCase,
        plan_limits::PlanLimitsUseCase,
    },
};
use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::{
            plan_accounts::PlanAccountRepository, properties::PropertyLifecycleRepository,
        },
        value_objects::{
            plan_enforcement::ExpirationOutcome,
            plans::{
                ActivationCheck, PlanCatalogEntry, PlanLimits, PlanQuote, QuoteQuery,
                UserPlanInfoDto,
            },
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{plan_accounts::PlanAccountPostgres, properties::PropertyLifecyclePostgres},
    },
};
use std::sync::Arc;
use tracing::info;

pub struct PlansState<U, P>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    limits: PlanLimitsUseCase<U, P>,
    expiration: PlanExpirationUseCase<U, P>,
    changes: PlanChangeUseCase<U>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let account_repository = Arc::new(PlanAccountPostgres::new(Arc::clone(&db_pool)));
    let property_repository = Arc::new(PropertyLifecyclePostgres::new(Arc::clone(&db_pool)));

    let state = PlansState {
        limits: PlanLimitsUseCase::new(
            Arc::clone(&account_repository),
            Arc::clone(&property_repository),
        ),
        expiration: PlanExpirationUseCase::new(
            Arc::clone(&account_repository),
            Arc::clone(&property_repository),
        ),
        changes: PlanChangeUseCase::new(account_repository, config.founder.clone()),
    };

    Router::new()
        .route("/", get(catalog))
        .route("/me", get(my_plan))
        .route("/me/limits", get(my_limits))
        .route("/me/can-activate", get(can_activate))
        .route("/me/check-expiration", post(check_my_expiration))
        .route("/quote", get(quote))
        .with_state(Arc::new(state))
}

pub async fn catalog<U, P>(State(state): State<Arc<PlansState<U, P>>>) -> Json<Vec<PlanCatalogEntry>>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    Json(state.limits.catalog())
}

pub async fn my_plan<U, P>(
    State(state): State<Arc<PlansState<U, P>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<Json<UserPlanInfoDto>, AppError>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    Ok(Json(state.limits.get_user_plan_info(user_id).await?))
}

pub async fn my_limits<U, P>(
    State(state): State<Arc<PlansState<U, P>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<Json<PlanLimits>, AppError>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    Ok(Json(state.limits.get_user_plan_limits(user_id).await?))
}

pub async fn can_activate<U, P>(
    State(state): State<Arc<PlansState<U, P>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<Json<ActivationCheck>, AppError>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    Ok(Json(state.limits.can_user_activate_property(user_id).await?))
}

pub async fn check_my_expiration<U, P>(
    State(state): State<Arc<PlansState<U, P>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<Json<ExpirationOutcome>, AppError>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    info!(%user_id, "plans: expiration check requested");
    Ok(Json(state.expiration.check_expiration(user_id).await?))
}

pub async fn quote<U, P>(
    State(state): State<Arc<PlansState<U, P>>>,
    AuthUser { user_id, .. }: AuthUser,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<PlanQuote>, AppError>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    Ok(Json(
        state
            .changes
            .quote(user_id, query.tier, query.months)
            .await?,
    ))
}
