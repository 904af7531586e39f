use std::collections::HashMap;

use sqlx::types::Json;
use sqlx::PgPool;

use crate::fulfillment::SpecialSystemIds;
use crate::models::{Branch, Product};
use crate::orders::error::OrderError;
use crate::orders::{Order, OrderLineItem, OrderStatus};

const ORDER_COLUMNS: &str = "id, customer_name, phone, email, branch_id, delivery_date, \
     delivery_time, items, status, created_at, updated_at";

/// Repository for branch reference data
#[derive(Clone)]
pub struct BranchRepository {
    pool: PgPool,
}

impl BranchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a branch by ID
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Branch>, OrderError> {
        let branch = sqlx::query_as::<_, Branch>(
            "SELECT id, name, address, connected_stripe_account FROM branches WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(branch)
    }
}

/// Repository for catalog products
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find multiple products by IDs
    pub async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Product>, OrderError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, category, bakery_system_id, special_system_ids, \
             stripe_price_id, archived FROM products WHERE id = ANY($1) AND NOT archived",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Seasonal substitute ids for a set of products, keyed by product id
    ///
    /// Products with an empty or unreadable `special_system_ids` column are
    /// simply absent from the map; the translator falls back to standard ids.
    pub async fn find_special_ids(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, SpecialSystemIds>, OrderError> {
        let products = self.find_by_ids(ids).await?;

        let map = products
            .into_iter()
            .filter_map(|product| {
                let raw = product.special_system_ids?;
                match serde_json::from_value::<SpecialSystemIds>(raw) {
                    Ok(ids) => Some((product.id, ids)),
                    Err(e) => {
                        tracing::warn!(
                            product_id = %product.id,
                            "Unreadable special_system_ids, skipping: {}", e
                        );
                        None
                    }
                }
            })
            .collect();

        Ok(map)
    }
}

/// Repository for order operations
#[derive(Clone)]
pub struct OrdersRepository {
    pool: PgPool,
}

impl OrdersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new order with its frozen line-item snapshot
    pub async fn create(
        &self,
        request: &crate::orders::CheckoutRequest,
        items: Vec<OrderLineItem>,
    ) -> Result<Order, OrderError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders
                (customer_name, phone, email, branch_id, delivery_date, delivery_time, items, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(&request.customer_name)
        .bind(&request.phone)
        .bind(&request.email)
        .bind(&request.branch_id)
        .bind(request.delivery_date)
        .bind(request.delivery_time)
        .bind(Json(items))
        .bind(OrderStatus::Pending)
        .fetch_one(&self.pool)
        .await?;

        Ok(order)
    }

    /// Find an order by ID
    pub async fn find_by_id(&self, order_id: i64) -> Result<Option<Order>, OrderError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Update order status, bumping updated_at
    pub async fn update_status(
        &self,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(OrderError::NotFound)?;

        Ok(order)
    }

    /// List orders for the admin dashboard, newest first
    pub async fn list(&self, page: i64, per_page: i64) -> Result<Vec<Order>, OrderError> {
        let offset = (page.max(1) - 1) * per_page;
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }
}
