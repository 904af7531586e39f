use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error types for availability-rule operations
#[derive(Debug, thiserror::Error)]
pub enum AvailabilityError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Rule not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for AvailabilityError {
    fn from(err: sqlx::Error) -> Self {
        AvailabilityError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for AvailabilityError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AvailabilityError::DatabaseError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AvailabilityError::NotFound => (StatusCode::NOT_FOUND, "Rule not found".to_string()),
            AvailabilityError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
