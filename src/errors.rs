use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::common::ApiResponse;

/// Errors surfaced by handlers. Every variant renders into the uniform
/// `{success: false, message, error}` body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                if cfg!(debug_assertions) {
                    ApiResponse::<()>::error_with_message("Internal server error", detail.clone())
                } else {
                    ApiResponse::<()>::error("Internal server error")
                }
            }
            other => ApiResponse::<()>::error(other.to_string()),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Failures coming out of a repository implementation.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Repository lock poisoned")]
    Poisoned,
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UniqueViolation(what) => {
                AppError::Conflict(format!("{} already exists", what))
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn variants_map_to_expected_status_codes() {
        assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Internal("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unique_violation_becomes_conflict() {
        let err: AppError = RepositoryError::UniqueViolation("Username".into()).into();
        assert!(matches!(err, AppError::Conflict(ref msg) if msg == "Username already exists"));
    }

    #[test]
    fn poisoned_lock_becomes_internal() {
        let err: AppError = RepositoryError::Poisoned.into();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[actix_web::test]
    async fn validation_error_body_has_uniform_shape() {
        let response = AppError::Validation("Invalid time".into()).error_response();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid time");
        assert_eq!(body["message"], "Invalid time");
    }
}
