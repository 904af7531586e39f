use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::availability::AvailabilityError;
use crate::fulfillment::FulfillmentError;

/// Error types for order operations
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Order not found")]
    NotFound,

    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Checkout denied by availability rules; carries the user-facing reasons
    #[error("Order not available")]
    Unavailable {
        messages: Vec<String>,
        blocked_price_ids: Vec<String>,
    },

    /// Checkout denied by the branch's ordering cutoff
    #[error("{0}")]
    CutoffViolation(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Payment provider error: {0}")]
    PaymentError(String),

    #[error("Fulfillment error: {0}")]
    FulfillmentError(String),
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::DatabaseError(err.to_string())
    }
}

impl From<AvailabilityError> for OrderError {
    fn from(err: AvailabilityError) -> Self {
        OrderError::DatabaseError(err.to_string())
    }
}

impl From<FulfillmentError> for OrderError {
    fn from(err: FulfillmentError) -> Self {
        OrderError::FulfillmentError(err.to_string())
    }
}

impl From<crate::payments::PaymentError> for OrderError {
    fn from(err: crate::payments::PaymentError) -> Self {
        OrderError::PaymentError(err.to_string())
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // The availability denial carries structured detail for the storefront
            OrderError::Unavailable {
                messages,
                blocked_price_ids,
            } => {
                let body = Json(json!({
                    "error": "Order not available",
                    "messages": messages,
                    "blocked_price_ids": blocked_price_ids,
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            OrderError::DatabaseError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            OrderError::NotFound => (StatusCode::NOT_FOUND, "Order not found".to_string()),
            OrderError::BranchNotFound(id) => {
                (StatusCode::BAD_REQUEST, format!("Branch {} not found", id))
            }
            OrderError::ProductNotFound(id) => {
                (StatusCode::BAD_REQUEST, format!("Product {} not found", id))
            }
            OrderError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            OrderError::CutoffViolation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            OrderError::InvalidTransition(msg) => (StatusCode::BAD_REQUEST, msg),
            OrderError::PaymentError(msg) => (StatusCode::BAD_GATEWAY, msg),
            OrderError::FulfillmentError(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
