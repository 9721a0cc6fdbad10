use crate::{
    auth::AuthUser, axum_http::error_responses::{AppError, AppJson},
    usecases::attachments::AttachmentUseCase,
};
use axum::{Json, Router, extract::State, routing::post};
use crates::{
    domain::{
        repositories::{
            attachments::AttachmentUsageRepository, plan_accounts::PlanAccountRepository,
        },
        value_objects::attachments::{AttachmentValidation, ValidateAttachmentsRequest},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{attachments::AttachmentUsagePostgres, plan_accounts::PlanAccountPostgres},
    },
};
use std::sync::Arc;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let account_repository = PlanAccountPostgres::new(Arc::clone(&db_pool));
    let usage_repository = AttachmentUsagePostgres::new(Arc::clone(&db_pool));
    let usecase = AttachmentUseCase::new(Arc::new(account_repository), Arc::new(usage_repository));

    Router::new()
        .route("/validate", post(validate_attachments))
        .with_state(Arc::new(usecase))
}

pub async fn validate_attachments<U, A>(
    State(usecase): State<Arc<AttachmentUseCase<U, A>>>,
    AuthUser { user_id, .. }: AuthUser,
    AppJson(request): AppJson<ValidateAttachmentsRequest>,
) -> Result<Json<AttachmentValidation>, AppError>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    A: AttachmentUsageRepository + Send + Sync + 'static,
{
    Ok(Json(usecase.validate(user_id, request.files).await?))
}
