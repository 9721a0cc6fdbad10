use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::post,
};
use crates::domain::repositories::{
    plan_accounts::PlanAccountRepository, properties::PropertyLifecycleRepository,
};
use serde::Deserialize;
use tracing::{error, warn};

use crate::usecases::sweep_expired_plans::{SweepExpiredPlansParams, SweepExpiredPlansUseCase};

// Run example
//   curl -X POST "http://localhost:$SERVER_PORT_WORKER/internal/v1/plans/expire" \
//     -H "Authorization: Bearer $INTERNAL_EXPIRATION_TOKEN" \
//     -H "Content-Type: application/json" \
//     -d '{"limit":100,"dry_run":true}'

pub struct ExpireRouteState<U, P>
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    internal_token: Option<String>,
    usecase: Arc<SweepExpiredPlansUseCase<U, P>>,
}

pub fn routes<U, P>(
    internal_token: Option<String>,
    usecase: Arc<SweepExpiredPlansUseCase<U, P>>,
) -> Router
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/expire", post(expire_plans::<U, P>))
        .with_state(Arc::new(ExpireRouteState {
            internal_token,
            usecase,
        }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpirePlansRequest {
    pub limit: Option<i64>,
    pub dry_run: Option<bool>,
}

pub async fn expire_plans<U, P>(
    State(state): State<Arc<ExpireRouteState<U, P>>>,
    headers: HeaderMap,
    payload: Result<Json<ExpirePlansRequest>, JsonRejection>,
) -> Response
where
    U: PlanAccountRepository + Send + Sync + 'static,
    P: PropertyLifecycleRepository + Send + Sync + 'static,
{
    if let Err(rejection) = check_internal_token(state.internal_token.as_deref(), &headers) {
        return rejection.into_response();
    }

    // A bare POST carries no body and runs with defaults.
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(JsonRejection::MissingJsonContentType(_)) => ExpirePlansRequest::default(),
        Err(rejection) => return rejection.into_response(),
    };

    let params = SweepExpiredPlansParams {
        limit: payload.limit,
        dry_run: payload.dry_run.unwrap_or(false),
    };

    match state.usecase.run(params).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => {
            error!(error = ?err, "expire_plans: sweep failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "expiration sweep failed").into_response()
        }
    }
}

fn check_internal_token(
    expected: Option<&str>,
    headers: &HeaderMap,
) -> Result<(), (StatusCode, &'static str)> {
    let Some(expected) = expected else {
        warn!("expire_plans: internal token is not configured");
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "expiration token is not configured",
        ));
    };

    authorize_bearer(headers, expected).map_err(|status| (status, "unauthorized"))
}

fn authorize_bearer(headers: &HeaderMap, expected_token: &str) -> Result<(), StatusCode> {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if token == expected_token {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}
