use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use crate::domain::models::appointment::ConflictingAppointment;

/// Shared by both "no such user" and "wrong password" so the two are indistinguishable.
pub const INVALID_CREDENTIALS: &str = "not found or bad credentials";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Username is already taken")]
    DuplicateUser,
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Delete of {failed} failed after removing {completed}: {reason}")]
    PartialCascade {
        completed: String,
        failed: String,
        reason: String,
    },
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Appointment collides with {} existing appointment(s)", .0.len())]
    ScheduleConflict(Vec<ConflictingAppointment>),
    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_credentials() -> Self {
        AppError::Auth(INVALID_CREDENTIALS.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::DuplicateUser => (StatusCode::CONFLICT, self.to_string()),
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Database(e) => {
                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
            AppError::Storage(msg) => {
                error!("Storage error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
            AppError::PartialCascade { .. } => {
                error!("{}", self);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": self.to_string(), "partial": true })),
                ).into_response();
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::ScheduleConflict(conflicts) => {
                return (
                    StatusCode::CONFLICT,
                    Json(json!({ "error": self.to_string(), "conflicts": conflicts })),
                ).into_response();
            }
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
