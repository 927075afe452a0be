use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use garage_core::{
    storage::{repository_error_to_status_code, RepositoryError},
    upload::UploadError,
};
use serde_json::json;

use crate::services::ServiceError;

/// Handler error, rendered as `{"error": "..."}`.
///
/// Server-side failures keep their cause for the log and answer with a
/// generic message.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Conflict(message) => (StatusCode::CONFLICT, message),
            AppError::Internal(err) => {
                tracing::error!(error = ?err, "Request failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response();
            }
        };

        tracing::warn!(status = %status, message = %message, "API error");
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match &err {
            RepositoryError::NotFound { .. } => AppError::NotFound(err.to_string()),
            RepositoryError::AlreadyExists {
                entity_type: "Car", ..
            } => AppError::BadRequest("VIN must be unique".to_string()),
            _ => match repository_error_to_status_code(&err) {
                400 => AppError::BadRequest(err.to_string()),
                409 => AppError::Conflict(err.to_string()),
                _ => AppError::Internal(err.into()),
            },
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Repository(err) => err.into(),
            ServiceError::Car(_)
            | ServiceError::Enquiry(_)
            | ServiceError::Filter(_)
            | ServiceError::DuplicateVin
            | ServiceError::UnknownCar(_) => AppError::BadRequest(err.to_string()),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        if err.is_client_error() {
            AppError::BadRequest(err.to_string())
        } else {
            AppError::Internal(err.into())
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}
