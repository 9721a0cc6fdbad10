use crate::{
    auth::AuthUser,
    axum_http::{
        error_responses::{AppError, AppJson},
        routers::reports,
    },
    usecases::property_lifecycle::PropertyLifecycleUseCase,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{patch, post},
};
use crates::{
    domain::{
        repositories::{
            plan_accounts::PlanAccountRepository, properties::PropertyLifecycleRepository,
        },
        value_objects::properties::{
            BulkActionRequest, BulkActionResult, PropertyLifecycleDto, UpdateStatusRequest,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{plan_accounts::PlanAccountPostgres, properties::PropertyLifecyclePostgres},
    },
};
use std::sync::Arc;
use uuid::Uuid;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let account_repository = PlanAccountPostgres::new(Arc::clone(&db_pool));
    let property_repository = PropertyLifecyclePostgres::new(Arc::clone(&db_pool));
    let usecase =
        PropertyLifecycleUseCase::new(Arc::new(account_repository), Arc::new(property_repository));

    Router::new()
        .route("/bulk", post(bulk))
        .route("/:id/publish", post(publish))
        .route("/:id/archive", post(archive))
        .route("/:id/status", patch(update_status))
        .route("/:id/featured", post(toggle_featured))
        .with_state(Arc::new(usecase))
        .merge(reports::routes(db_pool))
}

pub async fn publish<U, P>(
    State(usecase): State<Arc<PropertyLifecycleUseCase<U, P>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(property_id): Path<Uuid>,
) -> Result<Json<PropertyLifecycleDto>, AppError>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    Ok(Json(usecase.publish(user_id, property_id).await?))
}

pub async fn archive<U, P>(
    State(usecase): State<Arc<PropertyLifecycleUseCase<U, P>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(property_id): Path<Uuid>,
) -> Result<Json<PropertyLifecycleDto>, AppError>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    Ok(Json(usecase.archive(user_id, property_id).await?))
}

pub async fn update_status<U, P>(
    State(usecase): State<Arc<PropertyLifecycleUseCase<U, P>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(property_id): Path<Uuid>,
    AppJson(request): AppJson<UpdateStatusRequest>,
) -> Result<Json<PropertyLifecycleDto>, AppError>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    Ok(Json(
        usecase
            .update_status(user_id, property_id, request.status)
            .await?,
    ))
}

pub async fn toggle_featured<U, P>(
    State(usecase): State<Arc<PropertyLifecycleUseCase<U, P>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(property_id): Path<Uuid>,
) -> Result<Json<PropertyLifecycleDto>, AppError>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    Ok(Json(usecase.toggle_featured(user_id, property_id).await?))
}

pub async fn bulk<U, P>(
    State(usecase): State<Arc<PropertyLifecycleUseCase<U, P>>>,
    AuthUser { user_id, .. }: AuthUser,
    AppJson(request): AppJson<BulkActionRequest>,
) -> Result<Json<BulkActionResult>, AppError>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    Ok(Json(usecase.bulk(user_id, request).await?))
}
