// Transactional email receipts
//
// Strictly best-effort: the caller logs failures and never rolls back an
// order because a receipt did not go out.

use std::time::Duration;

use rust_decimal::Decimal;

use crate::orders::Order;

#[derive(Clone)]
pub struct EmailClient {
    client: reqwest::Client,
    api_key: String,
    from: String,
}

impl EmailClient {
    pub fn new(api_key: String, from: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key,
            from,
        }
    }

    /// Send the order receipt to the customer
    ///
    /// A missing API key disables delivery entirely, which keeps local
    /// development quiet without extra configuration.
    pub async fn send_receipt(&self, order: &Order) -> Result<(), String> {
        if self.api_key.is_empty() {
            tracing::debug!(order_id = order.id, "Email delivery disabled, skipping receipt");
            return Ok(());
        }

        let body = serde_json::json!({
            "from": self.from,
            "to": [order.email],
            "subject": format!("Confirmación de pedido #{}", order.id),
            "html": receipt_html(order),
        });

        let response = self
            .client
            .post("https://api.resend.com/emails")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("email provider returned {}", response.status()));
        }

        tracing::info!(order_id = order.id, "Receipt email sent");
        Ok(())
    }
}

fn receipt_html(order: &Order) -> String {
    let mut rows = String::new();
    let mut total = Decimal::ZERO;
    for item in order.items.iter() {
        let line_total = item.unit_price * Decimal::from(item.quantity);
        total += line_total;
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>${}</td></tr>",
            item.product_id, item.quantity, line_total
        ));
    }

    format!(
        "<h1>Gracias por tu pedido, {}</h1>\
         <p>Entrega: {} a las {}</p>\
         <table>{}</table>\
         <p><strong>Total: ${}</strong></p>",
        order.customer_name, order.delivery_date, order.delivery_time, rows, total
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::{OrderLineItem, OrderStatus};
    use chrono::{NaiveDate, NaiveTime, Utc};
    use rust_decimal_macros::dec;
    use sqlx::types::Json;

    #[test]
    fn test_receipt_totals_the_snapshot() {
        let order = Order {
            id: 9,
            customer_name: "Ana".to_string(),
            phone: "8112345678".to_string(),
            email: "ana@example.com".to_string(),
            branch_id: "44".to_string(),
            delivery_date: NaiveDate::from_ymd_opt(2025, 6, 26).unwrap(),
            delivery_time: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
            items: Json(vec![
                OrderLineItem {
                    product_id: "358".to_string(),
                    bakery_system_id: "98".to_string(),
                    stripe_price_id: "price_358".to_string(),
                    quantity: 2,
                    unit_price: dec!(620),
                    category: "pasteles".to_string(),
                    presentation: "anytime".to_string(),
                },
                OrderLineItem {
                    product_id: "565".to_string(),
                    bakery_system_id: "103".to_string(),
                    stripe_price_id: "price_565".to_string(),
                    quantity: 1,
                    unit_price: dec!(350),
                    category: "pasteles".to_string(),
                    presentation: "gift".to_string(),
                },
            ]),
            status: OrderStatus::Paid,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let html = receipt_html(&order);
        assert!(html.contains("Total: $1590"));
        assert!(html.contains("Ana"));
    }
}
