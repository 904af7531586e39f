use std::collections::HashMap;
use std::sync::Arc;

use chrono::{FixedOffset, Utc};

use crate::availability::AvailabilityEvaluator;
use crate::fulfillment::{
    check_rosca_window, presentation_price, special_date_kind, translate, Category, Presentation,
    RoutingTable, SystemUploader,
};
use crate::notifications::EmailClient;
use crate::orders::{
    BranchRepository, CheckoutRequest, CheckoutResponse, Order, OrderError, OrderLineItem,
    OrderStatus, OrdersRepository, ProductRepository, StatusMachine,
};
use crate::payments::{CardBrand, CheckoutLineItem, PaymentClient};

/// Service for the checkout and payment-confirmation flows
#[derive(Clone)]
pub struct OrderService {
    orders_repo: OrdersRepository,
    branch_repo: BranchRepository,
    product_repo: ProductRepository,
    availability: AvailabilityEvaluator,
    routing: Arc<RoutingTable>,
    payments: PaymentClient,
    uploader: SystemUploader,
    email: EmailClient,
    success_url: String,
    cancel_url: String,
    local_offset: FixedOffset,
}

impl OrderService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        orders_repo: OrdersRepository,
        branch_repo: BranchRepository,
        product_repo: ProductRepository,
        availability: AvailabilityEvaluator,
        routing: Arc<RoutingTable>,
        payments: PaymentClient,
        uploader: SystemUploader,
        email: EmailClient,
        success_url: String,
        cancel_url: String,
        local_offset: FixedOffset,
    ) -> Self {
        Self {
            orders_repo,
            branch_repo,
            product_repo,
            availability,
            routing,
            payments,
            uploader,
            email,
            success_url,
            cancel_url,
            local_offset,
        }
    }

    /// Start a checkout: gate it, persist it, open a payment session
    ///
    /// The order is persisted `Pending` before the payment session is created
    /// because the session carries the order id in its metadata. A session
    /// failure leaves the order visible as `PaymentError`.
    pub async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutResponse, OrderError> {
        let branch = self
            .branch_repo
            .find_by_id(&request.branch_id)
            .await?
            .ok_or_else(|| OrderError::BranchNotFound(request.branch_id.clone()))?;

        let product_ids: Vec<String> =
            request.items.iter().map(|i| i.product_id.clone()).collect();
        let catalog: HashMap<String, _> = self
            .product_repo
            .find_by_ids(&product_ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        // Freeze the snapshot now; nothing downstream re-derives prices
        let mut line_items = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let product = catalog
                .get(&item.product_id)
                .ok_or_else(|| OrderError::ProductNotFound(item.product_id.clone()))?;
            let category = Category::parse(&product.category);
            let presentation = Presentation::parse(&item.presentation);

            line_items.push(OrderLineItem {
                product_id: product.id.clone(),
                bakery_system_id: product.bakery_system_id.clone(),
                stripe_price_id: product.stripe_price_id.clone(),
                quantity: item.quantity,
                unit_price: presentation_price(category, presentation),
                category: category.as_str().to_string(),
                presentation: presentation.as_str().to_string(),
            });
        }

        let price_ids: Vec<String> = line_items
            .iter()
            .map(|l| l.stripe_price_id.clone())
            .collect();
        let verdict = self
            .availability
            .check_order(&price_ids, request.delivery_date, &request.branch_id)
            .await?;
        if !verdict.allowed {
            return Err(OrderError::Unavailable {
                messages: verdict.messages,
                blocked_price_ids: verdict.blocked_price_ids,
            });
        }

        let now = Utc::now().with_timezone(&self.local_offset);
        self.routing
            .check_order_time(&request.branch_id, request.delivery_date, now)
            .map_err(OrderError::CutoffViolation)?;

        let has_rosca = line_items
            .iter()
            .any(|l| l.category == Category::Roscas.as_str());
        if has_rosca {
            check_rosca_window(request.delivery_date, request.delivery_time)
                .map_err(OrderError::CutoffViolation)?;
        }

        let order = self.orders_repo.create(&request, line_items).await?;
        tracing::info!(order_id = order.id, branch_id = %order.branch_id, "Order created");

        let checkout_items: Vec<CheckoutLineItem> = order
            .items
            .iter()
            .map(|l| CheckoutLineItem {
                price_id: l.stripe_price_id.clone(),
                quantity: l.quantity,
            })
            .collect();
        let success_url = format!("{}?order={}", self.success_url, order.id);

        let checkout_url = match self
            .payments
            .create_checkout_session(
                order.id,
                &checkout_items,
                &branch.connected_stripe_account,
                &success_url,
                &self.cancel_url,
            )
            .await
        {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(order_id = order.id, "Checkout session creation failed: {}", e);
                let _ = self
                    .orders_repo
                    .update_status(order.id, OrderStatus::PaymentError)
                    .await;
                return Err(e.into());
            }
        };

        Ok(CheckoutResponse {
            order_id: order.id,
            checkout_url,
        })
    }

    /// Handle a payment confirmation: mark paid, upload to the POS, email
    ///
    /// Re-delivered confirmations for an already-paid order are skipped so
    /// the POS never receives the same order twice.
    pub async fn payment_succeeded(
        &self,
        order_id: i64,
        session_id: &str,
    ) -> Result<(), OrderError> {
        let order = self
            .orders_repo
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        if order.status == OrderStatus::Paid {
            tracing::warn!(order_id, "Duplicate payment confirmation ignored");
            return Ok(());
        }

        StatusMachine::transition(order.status, OrderStatus::Paid)
            .map_err(OrderError::InvalidTransition)?;
        let order = self
            .orders_repo
            .update_status(order_id, OrderStatus::Paid)
            .await?;
        tracing::info!(order_id, "Order marked paid");

        let card_brand = match self.payments.get_card_brand(session_id).await {
            Ok(brand) => brand,
            Err(e) => {
                tracing::warn!(order_id, "Card brand lookup failed, using default: {}", e);
                CardBrand::Other
            }
        };

        let special_ids = if special_date_kind(order.delivery_date).is_some() {
            let ids: Vec<String> = order.items.iter().map(|i| i.product_id.clone()).collect();
            self.product_repo.find_special_ids(&ids).await?
        } else {
            HashMap::new()
        };

        let payload = translate(&order, &special_ids, &self.routing, card_brand);
        self.uploader.upload(order.id, &payload).await?;

        // Receipt failure never rolls anything back
        if let Err(e) = self.email.send_receipt(&order).await {
            tracing::warn!(order_id, "Receipt email failed: {}", e);
        }

        Ok(())
    }

    /// Record a failed payment attempt
    pub async fn payment_failed(&self, order_id: i64) -> Result<(), OrderError> {
        let order = self
            .orders_repo
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        // A failure event arriving after a confirmation loses
        if !StatusMachine::is_valid_transition(order.status, OrderStatus::PaymentError) {
            tracing::warn!(
                order_id,
                status = %order.status,
                "Ignoring payment failure for order in terminal state"
            );
            return Ok(());
        }

        self.orders_repo
            .update_status(order_id, OrderStatus::PaymentError)
            .await?;
        tracing::info!(order_id, "Order marked payment_error");
        Ok(())
    }

    /// Admin dashboard listing, newest first
    pub async fn list_orders(&self, page: i64) -> Result<Vec<Order>, OrderError> {
        self.orders_repo.list(page, 20).await
    }
}
