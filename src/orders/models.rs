use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

/// Order status enum representing the payment lifecycle of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    PaymentError,
}

impl OrderStatus {
    /// Convert status to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::PaymentError => "payment_error",
        }
    }

    /// Parse status from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "payment_error" => Ok(OrderStatus::PaymentError),
            _ => Err(format!("Invalid order status: {}", s)),
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line of an order's frozen snapshot
///
/// Everything the fulfillment path needs is captured at creation time;
/// later catalog edits must not change what a paid order uploads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub product_id: String,
    /// Brand-specific legacy id used when the branch reports as a bakery counter
    pub bakery_system_id: String,
    pub stripe_price_id: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub category: String,
    pub presentation: String,
}

/// Domain model representing an order in the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub customer_name: String,
    pub phone: String,
    pub email: String,
    pub branch_id: String,
    pub delivery_date: NaiveDate,
    pub delivery_time: NaiveTime,
    pub items: Json<Vec<OrderLineItem>>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for one checkout item
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckoutItemRequest {
    #[validate(length(min = 1, message = "product_id must not be empty"))]
    pub product_id: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub presentation: String,
}

/// Request DTO for starting a checkout
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub customer_name: String,
    #[validate(length(min = 8, message = "Phone must have at least 8 digits"))]
    pub phone: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "branch_id must not be empty"))]
    pub branch_id: String,
    pub delivery_date: NaiveDate,
    pub delivery_time: NaiveTime,
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<CheckoutItemRequest>,
}

/// Response DTO for a started checkout
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: i64,
    /// Hosted payment page the customer is redirected to
    pub checkout_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_strings() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::PaymentError,
        ] {
            assert_eq!(OrderStatus::from_str(status.as_str()), Ok(status));
        }
        assert!(OrderStatus::from_str("refunded").is_err());
    }

    #[test]
    fn test_checkout_request_validation() {
        let request = CheckoutRequest {
            customer_name: "Ana".to_string(),
            phone: "8112345678".to_string(),
            email: "not-an-email".to_string(),
            branch_id: "44".to_string(),
            delivery_date: NaiveDate::from_ymd_opt(2025, 6, 26).unwrap(),
            delivery_time: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
            items: vec![CheckoutItemRequest {
                product_id: "358".to_string(),
                quantity: 1,
                presentation: "tradicional".to_string(),
            }],
        };

        assert!(request.validate().is_err());
    }
}
