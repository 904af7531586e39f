// Order fulfillment translator
//
// Converts a paid order's frozen line-item snapshot into the legacy
// point-of-sale wire shape. Prices always come from the snapshot; the
// special-date path only ever rewrites the routing identifier.

use std::collections::HashMap;

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::fulfillment::pricing::{
    legacy_presentation_id, special_date_kind, Category, Presentation, SpecialSystemIds,
};
use crate::fulfillment::routing::{Brand, RoutingTable};
use crate::orders::models::Order;
use crate::payments::CardBrand;

/// One line of the legacy upload payload
///
/// Field names are the POS system's contract and must not change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemOrderLine {
    #[serde(rename = "producto")]
    pub product: String,
    #[serde(rename = "cantidad")]
    pub quantity: i32,
    #[serde(rename = "presentacion")]
    pub presentation: String,
    #[serde(rename = "precioProducto")]
    pub product_price: f64,
    #[serde(rename = "precioPresentacion")]
    pub presentation_price: f64,
    #[serde(rename = "comentarios")]
    pub comments: String,
}

/// Full legacy upload payload
///
/// The address block is intentionally empty: this deployment does not
/// collect delivery addresses, but the POS endpoint requires the fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemOrder {
    #[serde(rename = "productos")]
    pub lines: Vec<SystemOrderLine>,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "sucursalId")]
    pub branch_id: String,
    #[serde(rename = "fechaPedido")]
    pub delivery_at: String,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "calle")]
    pub street: String,
    #[serde(rename = "numeroExterior")]
    pub exterior_number: String,
    #[serde(rename = "numeroInterior")]
    pub interior_number: String,
    #[serde(rename = "colonia")]
    pub neighborhood: String,
    #[serde(rename = "municipio")]
    pub municipality: String,
    #[serde(rename = "referencia")]
    pub reference: String,
    #[serde(rename = "forma_pago_id")]
    pub payment_method_code: String,
}

/// One-digit POS payment-method code for a card brand
///
/// Unknown brands settle on "0" rather than failing the upload.
pub fn payment_method_code(card_brand: CardBrand) -> &'static str {
    match card_brand {
        CardBrand::Visa => "0",
        CardBrand::Mastercard => "1",
        CardBrand::Amex => "2",
        CardBrand::Other => "0",
    }
}

/// Build the legacy payload for a paid order
///
/// `special_ids` holds the substitute POS identifiers for the order's catalog
/// products, pre-fetched by the caller when the delivery date is on the
/// seasonal allowlist. Quantities and the frozen snapshot prices are carried
/// through untouched.
pub fn translate(
    order: &Order,
    special_ids: &HashMap<String, SpecialSystemIds>,
    routing: &RoutingTable,
    card_brand: CardBrand,
) -> SystemOrder {
    let brand = routing.classify(&order.branch_id);
    let special = special_date_kind(order.delivery_date);

    let lines = order
        .items
        .iter()
        .map(|item| {
            let category = Category::parse(&item.category);
            let presentation = Presentation::parse(&item.presentation);

            let standard_id = match brand {
                Brand::Pasteleria => item.bakery_system_id.clone(),
                Brand::Postreria => item.product_id.clone(),
            };
            let product = special
                .and_then(|kind| {
                    special_ids
                        .get(&item.product_id)
                        .and_then(|ids| ids.lookup(brand, kind))
                })
                .map(str::to_string)
                .unwrap_or(standard_id);

            SystemOrderLine {
                product,
                quantity: item.quantity,
                presentation: legacy_presentation_id(category, presentation, brand).to_string(),
                product_price: 0.0,
                presentation_price: item.unit_price.to_f64().unwrap_or(0.0),
                comments: String::new(),
            }
        })
        .collect();

    SystemOrder {
        lines,
        phone: order.phone.clone(),
        name: order.customer_name.clone(),
        branch_id: order.branch_id.clone(),
        delivery_at: format!(
            "{}T{}",
            order.delivery_date,
            order.delivery_time.format("%H:%M:%S")
        ),
        address: String::new(),
        street: String::new(),
        exterior_number: String::new(),
        interior_number: String::new(),
        neighborhood: String::new(),
        municipality: String::new(),
        reference: String::new(),
        payment_method_code: payment_method_code(card_brand).to_string(),
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::orders::models::{OrderLineItem, OrderStatus};
    use chrono::{NaiveDate, NaiveTime, Utc};
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use sqlx::types::Json;

    fn arbitrary_items() -> impl Strategy<Value = Vec<OrderLineItem>> {
        prop::collection::vec(
            (1i32..=20, 1u32..=500_000u32, 0usize..3usize).prop_map(|(qty, cents, pres)| {
                let presentation = ["tradicional", "anytime", "gift"][pres];
                OrderLineItem {
                    product_id: "358".to_string(),
                    bakery_system_id: "98".to_string(),
                    stripe_price_id: "price_358".to_string(),
                    quantity: qty,
                    unit_price: Decimal::from(cents) / Decimal::from(100),
                    category: "pasteles".to_string(),
                    presentation: presentation.to_string(),
                }
            }),
            1..6,
        )
    }

    fn line_total(payload: &SystemOrder) -> f64 {
        payload
            .lines
            .iter()
            .map(|l| l.presentation_price * l.quantity as f64)
            .sum()
    }

    /// Special-date substitution never changes line totals, only identifiers
    #[test]
    fn prop_special_date_preserves_totals() {
        proptest!(|(items in arbitrary_items())| {
            let routing = RoutingTable::default();
            let special_ids = {
                let mut map = std::collections::HashMap::new();
                map.insert(
                    "358".to_string(),
                    crate::fulfillment::pricing::SpecialSystemIds {
                        postreria: crate::fulfillment::pricing::SpecialIdPair {
                            pre_christmas: Some("9358".to_string()),
                            christmas_eve: Some("8358".to_string()),
                        },
                        pasteleria: Default::default(),
                    },
                );
                map
            };

            let base = Order {
                id: 7,
                customer_name: "Cliente".to_string(),
                phone: "8100000000".to_string(),
                email: "c@example.com".to_string(),
                branch_id: "44".to_string(),
                delivery_date: NaiveDate::from_ymd_opt(2025, 6, 26).unwrap(),
                delivery_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
                items: Json(items),
                status: OrderStatus::Paid,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            let mut seasonal = base.clone();
            seasonal.delivery_date = NaiveDate::from_ymd_opt(2025, 12, 23).unwrap();

            let normal = translate(&base, &special_ids, &routing, CardBrand::Visa);
            let substituted = translate(&seasonal, &special_ids, &routing, CardBrand::Visa);

            prop_assert_eq!(line_total(&normal), line_total(&substituted));
            for (a, b) in normal.lines.iter().zip(substituted.lines.iter()) {
                prop_assert_eq!(a.quantity, b.quantity);
                prop_assert_eq!(a.presentation_price, b.presentation_price);
            }
        });
    }
}
