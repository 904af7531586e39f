//! Orders: checkout, payment confirmation, fulfillment hand-off
//!
//! An order is created `Pending` with a frozen line-item snapshot, becomes
//! `Paid` via the payment webhook (which also uploads it to the legacy POS),
//! or `PaymentError` when the session fails or the payment is declined.

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod status_machine;

pub use error::OrderError;
pub use models::{
    CheckoutItemRequest, CheckoutRequest, CheckoutResponse, Order, OrderLineItem, OrderStatus,
};
pub use repository::{BranchRepository, OrdersRepository, ProductRepository};
pub use service::OrderService;
pub use status_machine::StatusMachine;
