use async_trait::async_trait;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::usecases::errors::UseCaseError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    UseCase(#[from] UseCaseError),
}

impl AppError {
    fn parts(self) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            AppError::UseCase(UseCaseError::Internal(err)) => {
                error!(error = ?err, "http: internal error");
                // Don't leak internal error detail to client
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::UseCase(err) => {
                let status = err.status_code();
                let code = err.error_code();
                let details = match &err {
                    UseCaseError::Attachment(violation) => Some(violation.details.clone()),
                    _ => None,
                };
                (status, code, err.to_string(), details)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message, details) = self.parts();

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            error,
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// `Json` whose rejection is reported as a `BAD_REQUEST` error body.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn internal_errors_hide_detail() {
        let (status, code, message, _) =
            AppError::UseCase(UseCaseError::Internal(anyhow!("connection refused"))).parts();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "INTERNAL");
        assert_eq!(message, "Internal server error");
    }

    #[test]
    fn use_case_errors_keep_their_status() {
        let (status, code, _, _) = AppError::UseCase(UseCaseError::NotFound("property")).parts();

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let request = Request::builder()
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{\"tier\":"))
            .unwrap();

        let err = match AppJson::<serde_json::Value>::from_request(request, &()).await {
            Err(err) => err,
            Ok(_) => panic!("truncated body must be rejected"),
        };
        let (status, code, _, _) = err.parts();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "BAD_REQUEST");
    }
}
