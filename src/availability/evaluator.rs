// Availability evaluator
//
// Decides whether a (date, branch, items) checkout attempt may proceed.
// Day-level rules dominate; otherwise the oldest matching rule per item
// decides. The decision itself is pure; only rule loading touches the store.

use chrono::NaiveDate;

use crate::availability::error::AvailabilityError;
use crate::availability::models::{AvailabilityRule, ItemAvailability, OrderAvailability};
use crate::availability::store::RuleStore;

const MSG_DAY: &str = "No hay entregas disponibles para esta fecha";
const MSG_BRANCH: &str = "Esta sucursal no está disponible para la fecha seleccionada";
const MSG_PRODUCT: &str = "Un producto no está disponible en esta fecha";
const MSG_BRANCH_PRODUCT: &str =
    "Un producto no está disponible para la sucursal seleccionada en esta fecha";

/// Why a single item came back blocked
fn match_rule<'a>(
    rule: &'a AvailabilityRule,
    branch_id: &str,
    price_id: &str,
) -> Option<&'static str> {
    let branch_set = !rule.branch_ids.is_empty();
    let product_set = !rule.product_ids.is_empty();

    match (branch_set, product_set) {
        (true, true) => {
            let branch_hit = rule.branch_ids.iter().any(|b| b == branch_id);
            let product_hit = rule.product_ids.iter().any(|p| p == price_id);
            (branch_hit && product_hit).then_some(MSG_BRANCH_PRODUCT)
        }
        (true, false) => rule
            .branch_ids
            .iter()
            .any(|b| b == branch_id)
            .then_some(MSG_BRANCH),
        (false, true) => rule
            .product_ids
            .iter()
            .any(|p| p == price_id)
            .then_some(MSG_PRODUCT),
        // A rule that names neither set matches nothing; malformed legacy
        // rows decode to this shape and must fail open
        (false, false) => None,
    }
}

/// Evaluate a set of already-loaded rules against a checkout attempt
pub fn evaluate(
    rules: &[AvailabilityRule],
    price_ids: &[String],
    branch_id: &str,
) -> OrderAvailability {
    if rules.is_empty() {
        return OrderAvailability {
            allowed: true,
            messages: Vec::new(),
            blocked_price_ids: Vec::new(),
        };
    }

    // A whole-day block applies to every item regardless of other rules
    if rules.iter().any(|r| r.day_disabled) {
        return OrderAvailability {
            allowed: false,
            messages: vec![MSG_DAY.to_string()],
            blocked_price_ids: price_ids.to_vec(),
        };
    }

    let mut messages: Vec<String> = Vec::new();
    let mut blocked_price_ids = Vec::new();

    for price_id in price_ids {
        let reason = rules
            .iter()
            .find_map(|rule| match_rule(rule, branch_id, price_id));

        if let Some(reason) = reason {
            blocked_price_ids.push(price_id.clone());
            if !messages.iter().any(|m| m == reason) {
                messages.push(reason.to_string());
            }
        }
    }

    OrderAvailability {
        allowed: blocked_price_ids.is_empty(),
        messages,
        blocked_price_ids,
    }
}

/// Availability evaluator backed by the rule store
#[derive(Clone)]
pub struct AvailabilityEvaluator {
    store: RuleStore,
}

impl AvailabilityEvaluator {
    pub fn new(store: RuleStore) -> Self {
        Self { store }
    }

    /// Gate a checkout attempt
    pub async fn check_order(
        &self,
        price_ids: &[String],
        date: NaiveDate,
        branch_id: &str,
    ) -> Result<OrderAvailability, AvailabilityError> {
        let rules = self.store.rules_for_date(date).await?;
        let verdict = evaluate(&rules, price_ids, branch_id);

        if !verdict.allowed {
            tracing::info!(
                %date,
                branch_id,
                blocked = verdict.blocked_price_ids.len(),
                "Checkout blocked by availability rules"
            );
        }

        Ok(verdict)
    }

    /// Single-item pre-check for storefront UIs
    pub async fn is_blocked(
        &self,
        price_id: &str,
        date: NaiveDate,
        branch_id: &str,
    ) -> Result<ItemAvailability, AvailabilityError> {
        let rules = self.store.rules_for_date(date).await?;
        let verdict = evaluate(&rules, &[price_id.to_string()], branch_id);

        Ok(ItemAvailability {
            blocked: !verdict.allowed,
            message: verdict.messages.into_iter().next(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::models::RuleScope;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn rule(
        scope: RuleScope,
        branch_ids: &[&str],
        product_ids: &[&str],
        created_secs: i64,
    ) -> AvailabilityRule {
        AvailabilityRule {
            id: Uuid::new_v4(),
            rule_date: chrono::NaiveDate::from_ymd_opt(2025, 6, 26).unwrap(),
            scope,
            day_disabled: scope == RuleScope::Day,
            branch_ids: branch_ids.iter().map(|s| s.to_string()).collect(),
            product_ids: product_ids.iter().map(|s| s.to_string()).collect(),
            time_slots: Vec::new(),
            created_at: Utc.timestamp_opt(1_750_000_000 + created_secs, 0).unwrap(),
        }
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_rules_allows_everything() {
        let verdict = evaluate(&[], &ids(&["price_a", "price_b"]), "44");
        assert!(verdict.allowed);
        assert!(verdict.messages.is_empty());
        assert!(verdict.blocked_price_ids.is_empty());
    }

    #[test]
    fn test_day_disabled_dominates_everything() {
        let rules = vec![
            rule(RuleScope::Products, &[], &["price_a"], 0),
            rule(RuleScope::Day, &[], &[], 1),
        ];
        let verdict = evaluate(&rules, &ids(&["price_a", "price_b"]), "44");

        assert!(!verdict.allowed);
        assert_eq!(verdict.messages, vec![MSG_DAY]);
        assert_eq!(verdict.blocked_price_ids, ids(&["price_a", "price_b"]));
    }

    #[test]
    fn test_branch_rule_blocks_whole_order_at_that_branch() {
        let rules = vec![rule(RuleScope::Branches, &["44", "109"], &[], 0)];

        let at_44 = evaluate(&rules, &ids(&["price_a", "price_b"]), "44");
        assert!(!at_44.allowed);
        assert_eq!(at_44.blocked_price_ids, ids(&["price_a", "price_b"]));
        assert_eq!(at_44.messages, vec![MSG_BRANCH]);

        let at_106 = evaluate(&rules, &ids(&["price_a", "price_b"]), "106");
        assert!(at_106.allowed);
    }

    #[test]
    fn test_product_rule_blocks_globally() {
        let rules = vec![rule(RuleScope::Products, &[], &["price_a"], 0)];

        for branch in ["44", "106", "999"] {
            let verdict = evaluate(&rules, &ids(&["price_a", "price_b"]), branch);
            assert!(!verdict.allowed);
            assert_eq!(verdict.blocked_price_ids, ids(&["price_a"]));
            assert_eq!(verdict.messages, vec![MSG_PRODUCT]);
        }
    }

    #[test]
    fn test_combined_rule_needs_both_to_match() {
        // The worked scenario: price_x blocked at branches 44 and 109 only
        let rules = vec![rule(
            RuleScope::BranchesAndProducts,
            &["44", "109"],
            &["price_x"],
            0,
        )];

        let at_44 = evaluate(&rules, &ids(&["price_x", "price_y"]), "44");
        assert!(!at_44.allowed);
        assert_eq!(at_44.blocked_price_ids, ids(&["price_x"]));
        assert_eq!(at_44.messages, vec![MSG_BRANCH_PRODUCT]);

        let at_106 = evaluate(&rules, &ids(&["price_x", "price_y"]), "106");
        assert!(at_106.allowed);

        let other_product = evaluate(&rules, &ids(&["price_y"]), "44");
        assert!(other_product.allowed);
    }

    #[test]
    fn test_oldest_matching_rule_decides() {
        let rules = vec![
            rule(RuleScope::Products, &[], &["price_a"], 0),
            rule(RuleScope::BranchesAndProducts, &["44"], &["price_a"], 1),
        ];
        let verdict = evaluate(&rules, &ids(&["price_a"]), "44");

        assert_eq!(verdict.messages, vec![MSG_PRODUCT]);
    }

    #[test]
    fn test_messages_are_deduplicated() {
        let rules = vec![rule(RuleScope::Products, &[], &["price_a", "price_b"], 0)];
        let verdict = evaluate(&rules, &ids(&["price_a", "price_b"]), "44");

        assert_eq!(verdict.blocked_price_ids.len(), 2);
        assert_eq!(verdict.messages, vec![MSG_PRODUCT]);
    }

    #[test]
    fn test_empty_rule_matches_nothing() {
        // Shape a malformed legacy row decodes to
        let rules = vec![rule(RuleScope::Branches, &[], &[], 0)];
        let verdict = evaluate(&rules, &ids(&["price_a"]), "44");
        assert!(verdict.allowed);
    }
}
