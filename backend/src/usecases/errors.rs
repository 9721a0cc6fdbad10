use axum::http::StatusCode;
use crates::domain::value_objects::attachments::{AttachmentViolation, AttachmentViolationCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    PlanLimitReached(String),
    #[error("{0} is not included in the current plan")]
    FeatureNotInPlan(&'static str),
    #[error("{0}")]
    Attachment(AttachmentViolation),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl UseCaseError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UseCaseError::NotFound(_) => StatusCode::NOT_FOUND,
            UseCaseError::Forbidden(_) | UseCaseError::FeatureNotInPlan(_) => {
                StatusCode::FORBIDDEN
            }
            UseCaseError::BadRequest(_) => StatusCode::BAD_REQUEST,
            UseCaseError::Conflict(_) => StatusCode::CONFLICT,
            UseCaseError::PlanLimitReached(_) => StatusCode::PAYMENT_REQUIRED,
            UseCaseError::Attachment(violation) => match violation.code {
                AttachmentViolationCode::DailyQuota => StatusCode::TOO_MANY_REQUESTS,
                AttachmentViolationCode::PlanRequired => StatusCode::PAYMENT_REQUIRED,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            },
            UseCaseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for clients.
    pub fn error_code(&self) -> &'static str {
        match self {
            UseCaseError::NotFound(_) => "NOT_FOUND",
            UseCaseError::Forbidden(_) => "FORBIDDEN",
            UseCaseError::BadRequest(_) => "BAD_REQUEST",
            UseCaseError::Conflict(_) => "CONFLICT",
            UseCaseError::PlanLimitReached(_) => "PLAN_LIMIT_REACHED",
            UseCaseError::FeatureNotInPlan(_) => "FEATURE_NOT_IN_PLAN",
            UseCaseError::Attachment(violation) => match violation.code {
                AttachmentViolationCode::InvalidFile => "INVALID_FILE",
                AttachmentViolationCode::PlanRequired => "PLAN_REQUIRED",
                AttachmentViolationCode::MaxFiles => "MAX_FILES",
                AttachmentViolationCode::SizeLimit => "SIZE_LIMIT",
                AttachmentViolationCode::MimeNotAllowed => "MIME_NOT_ALLOWED",
                AttachmentViolationCode::DailyQuota => "DAILY_QUOTA",
            },
            UseCaseError::Internal(_) => "INTERNAL",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, UseCaseError>;
