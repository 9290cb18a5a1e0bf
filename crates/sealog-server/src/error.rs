//! Server error type and its HTTP mapping

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sealog_common::SealogError;
use thiserror::Error;

use crate::{access::AccessError, api::response::ErrorResponse, store::StoreError};

pub type AppResult<T> = std::result::Result<T, AppError>;

/// Application error types
///
/// Every request-level failure ends up here. Validation and authorization
/// failures are decided before any store mutation is attempted.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    StoreUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn no_records() -> Self {
        AppError::NotFound("No records found".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::StoreUnavailable(message) => tracing::error!("Store error: {}", message),
            AppError::Internal(message) => tracing::error!("Internal error: {}", message),
            _ => tracing::debug!(status = status.as_u16(), "Request rejected: {}", self),
        }

        let body = ErrorResponse::new(self.code(), self.to_string());
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { .. } => AppError::Conflict(err.to_string()),
            StoreError::Pattern(_) => AppError::Validation(err.to_string()),
            other => {
                tracing::error!("Store failure: {:?}", other);
                AppError::StoreUnavailable("database error".to_string())
            },
        }
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::HiddenRequested { .. } => AppError::Forbidden(err.to_string()),
            AccessError::NotVisible { .. } => AppError::Unauthorized(err.to_string()),
            AccessError::Unauthenticated => AppError::Unauthorized(err.to_string()),
            AccessError::MissingRole { .. } => AppError::Forbidden(err.to_string()),
        }
    }
}

impl From<SealogError> for AppError {
    fn from(err: SealogError) -> Self {
        match err {
            SealogError::InvalidIdentifier(_) | SealogError::InvalidTimestamp(_) => {
                AppError::Validation(err.to_string())
            },
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Internal(format!("CSV rendering failed: {err}"))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
