// Reference-data models shared across modules

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A physical bakery branch
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub address: String,
    /// Settlement sub-account checkout sessions are created against
    pub connected_stripe_account: String,
}

/// A catalog product
///
/// `special_system_ids` mirrors the seasonal substitute-id table the
/// translator consumes; it stays raw JSON here and is decoded where used.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Legacy id used when the order routes to the bakery-counter tenant
    pub bakery_system_id: String,
    #[schema(value_type = Option<Object>)]
    pub special_system_ids: Option<serde_json::Value>,
    pub stripe_price_id: String,
    pub archived: bool,
}
