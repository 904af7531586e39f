// HTTP handlers for availability-rule administration and storefront pre-checks

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::availability::{
    AvailabilityError, AvailabilityRule, CreateRuleOutcome, CreateRuleRequest, ItemAvailability,
};

/// Query parameters for listing rules
#[derive(Debug, Deserialize)]
pub struct ListRulesQuery {
    pub date: Option<NaiveDate>,
}

/// Query parameters for the single-item pre-check
#[derive(Debug, Deserialize)]
pub struct CheckItemQuery {
    pub price_id: String,
    pub date: NaiveDate,
    pub branch_id: String,
}

/// Handler for POST /api/availability/rules
/// Creates a blocking rule, or reports the existing one for the same date and scope
pub async fn create_rule_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateRuleRequest>,
) -> Result<(StatusCode, Json<CreateRuleOutcome>), AvailabilityError> {
    let outcome = state.rule_store.create_rule(request).await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome)))
}

/// Handler for GET /api/availability/rules
/// Lists rules for the admin dashboard, optionally filtered by date
pub async fn list_rules_handler(
    State(state): State<crate::AppState>,
    Query(query): Query<ListRulesQuery>,
) -> Result<Json<Vec<AvailabilityRule>>, AvailabilityError> {
    let rules = state.rule_store.list_rules(query.date).await?;
    Ok(Json(rules))
}

/// Handler for DELETE /api/availability/rules/{rule_id}
pub async fn delete_rule_handler(
    State(state): State<crate::AppState>,
    Path(rule_id): Path<Uuid>,
) -> Result<StatusCode, AvailabilityError> {
    state.rule_store.delete_rule(rule_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/availability/check
/// Single-item pre-check so the storefront can grey out blocked dates
pub async fn check_item_handler(
    State(state): State<crate::AppState>,
    Query(query): Query<CheckItemQuery>,
) -> Result<Json<ItemAvailability>, AvailabilityError> {
    let verdict = state
        .availability
        .is_blocked(&query.price_id, query.date, &query.branch_id)
        .await?;
    Ok(Json(verdict))
}
