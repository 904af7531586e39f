//! Date-blocking availability rules
//!
//! Admin-created rules block a date entirely, for chosen branches, for
//! chosen products, or for products at specific branches. Every checkout
//! attempt is evaluated against the rules for its delivery date.

pub mod error;
pub mod evaluator;
pub mod handlers;
pub mod models;
pub mod store;

pub use error::AvailabilityError;
pub use evaluator::{evaluate, AvailabilityEvaluator};
pub use models::{
    AvailabilityRule, CreateRuleOutcome, CreateRuleRequest, ItemAvailability, OrderAvailability,
    RuleScope,
};
pub use store::RuleStore;
