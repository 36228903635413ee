use crate::domain::error::DomainError;
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

pub(crate) type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
}

pub(crate) fn domain_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        DomainError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::CorruptData(_) | DomainError::Unexpected(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Message safe to show to the caller; server-side details stay in the logs.
pub(crate) fn domain_message(err: &DomainError) -> String {
    match err {
        DomainError::StorageUnavailable(_) => "storage unavailable".to_string(),
        DomainError::CorruptData(_) => "stored data is corrupt".to_string(),
        DomainError::Unexpected(_) => "internal error".to_string(),
        _ => err.to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            AppError::Domain(err) => {
                let status = domain_status(&err);
                if status.is_server_error() {
                    error!(error = %err, "request failed");
                }
                (status, domain_message(&err))
            }
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
        };

        (status, Json(ErrorBody { error: msg })).into_response()
    }
}
