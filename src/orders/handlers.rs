// HTTP handlers for checkout, the payment webhook, and the admin listing

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::orders::{CheckoutRequest, CheckoutResponse, Order, OrderError};
use crate::payments::{verify_webhook_signature, WebhookEvent};

/// Query parameters for the admin order listing
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub page: Option<i64>,
}

/// Handler for POST /api/orders/checkout
/// Gates the order against availability and cutoff rules, persists it, and
/// returns the hosted payment URL
pub async fn checkout_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), OrderError> {
    request
        .validate()
        .map_err(|e| OrderError::ValidationError(e.to_string()))?;
    for item in &request.items {
        item.validate()
            .map_err(|e| OrderError::ValidationError(e.to_string()))?;
    }

    let response = state.order_service.checkout(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for POST /api/webhook
/// Verifies the provider signature over the raw body, then dispatches the
/// event. After verification the provider always gets 200 so a downstream
/// failure here does not trigger a retry storm; failures are logged and the
/// order keeps a visible state.
pub async fn webhook_handler(
    State(state): State<crate::AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if let Err(e) = verify_webhook_signature(&body, signature, &state.config.stripe_webhook_secret)
    {
        tracing::warn!("Rejected webhook: {}", e);
        return StatusCode::BAD_REQUEST;
    }

    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Unparseable webhook body: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    let order_id = event
        .data
        .object
        .metadata
        .order_id
        .as_deref()
        .and_then(|v| v.parse::<i64>().ok());

    match (event.event_type.as_str(), order_id) {
        ("checkout.session.completed", Some(order_id)) => {
            if let Err(e) = state
                .order_service
                .payment_succeeded(order_id, &event.data.object.id)
                .await
            {
                tracing::error!(order_id, "Payment confirmation processing failed: {}", e);
            }
        }
        ("checkout.session.expired", Some(order_id))
        | ("payment_intent.payment_failed", Some(order_id)) => {
            if let Err(e) = state.order_service.payment_failed(order_id).await {
                tracing::error!(order_id, "Payment failure processing failed: {}", e);
            }
        }
        (event_type, None) => {
            tracing::warn!(event_type, "Webhook event without an order id, ignoring");
        }
        (event_type, _) => {
            tracing::debug!(event_type, "Ignoring unhandled webhook event");
        }
    }

    StatusCode::OK
}

/// Handler for GET /api/orders
/// Admin dashboard listing, newest first
pub async fn list_orders_handler(
    State(state): State<crate::AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<Order>>, OrderError> {
    let orders = state
        .order_service
        .list_orders(query.page.unwrap_or(1))
        .await?;
    Ok(Json(orders))
}
