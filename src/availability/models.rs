use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a blocking rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RuleScope {
    /// The whole date, every branch and product
    Day,
    /// The listed branches only
    Branches,
    /// The listed products only, at every branch
    Products,
    /// The listed products at the listed branches
    BranchesAndProducts,
}

impl RuleScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleScope::Day => "day",
            RuleScope::Branches => "branches",
            RuleScope::Products => "products",
            RuleScope::BranchesAndProducts => "branches_and_products",
        }
    }
}

impl std::fmt::Display for RuleScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A date-blocking rule as the rest of the application sees it
///
/// The id sets are already parsed; rows never leave the store half-decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub id: Uuid,
    pub rule_date: NaiveDate,
    pub scope: RuleScope,
    pub day_disabled: bool,
    pub branch_ids: Vec<String>,
    pub product_ids: Vec<String>,
    /// Disabled "HH:00" tokens, surfaced for admin tooling
    pub time_slots: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Decode a stored id set defensively
///
/// Historical rows hold either a JSON array, a JSON-encoded string containing
/// an array, or junk. Anything unreadable decodes to the empty set so a bad
/// row can never block an order it was not meant to.
pub fn parse_id_set(raw: Option<&serde_json::Value>) -> Vec<String> {
    let Some(value) = raw else {
        return Vec::new();
    };

    let from_array = |arr: &[serde_json::Value]| {
        arr.iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect::<Vec<_>>()
    };

    match value {
        serde_json::Value::Array(arr) => from_array(arr),
        // Doubly-encoded rows: a JSON string whose content is itself an array
        serde_json::Value::String(inner) => match serde_json::from_str::<serde_json::Value>(inner)
        {
            Ok(serde_json::Value::Array(arr)) => from_array(&arr),
            _ => {
                tracing::warn!("Unreadable stored id set, treating as empty: {}", inner);
                Vec::new()
            }
        },
        other => {
            tracing::warn!("Unreadable stored id set, treating as empty: {}", other);
            Vec::new()
        }
    }
}

/// Split the legacy comma-separated time-slot column
pub fn parse_time_slots(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

/// Request DTO for creating a blocking rule
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRuleRequest {
    pub rule_date: NaiveDate,
    pub scope: RuleScope,
    #[serde(default)]
    pub branch_ids: Vec<String>,
    #[serde(default)]
    pub product_ids: Vec<String>,
    #[serde(default)]
    pub time_slots: Vec<String>,
}

impl CreateRuleRequest {
    /// Scope-specific shape check, applied before insert
    pub fn check_scope(&self) -> Result<(), String> {
        match self.scope {
            RuleScope::Day => Ok(()),
            RuleScope::Branches if self.branch_ids.is_empty() => {
                Err("branch_ids must not be empty for a branch rule".to_string())
            }
            RuleScope::Products if self.product_ids.is_empty() => {
                Err("product_ids must not be empty for a product rule".to_string())
            }
            RuleScope::BranchesAndProducts
                if self.branch_ids.is_empty() || self.product_ids.is_empty() =>
            {
                Err("branch_ids and product_ids must both be set for a combined rule".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Outcome of a rule-creation request
#[derive(Debug, Clone, Serialize)]
pub struct CreateRuleOutcome {
    pub rule: AvailabilityRule,
    pub created: bool,
    pub message: String,
}

/// Availability verdict for a single item
#[derive(Debug, Clone, Serialize)]
pub struct ItemAvailability {
    pub blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Availability verdict for a whole checkout attempt
#[derive(Debug, Clone, Serialize)]
pub struct OrderAvailability {
    pub allowed: bool,
    /// Deduplicated user-facing reasons, first-seen order
    pub messages: Vec<String>,
    pub blocked_price_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_id_set_plain_array() {
        let value = json!(["44", "109"]);
        assert_eq!(parse_id_set(Some(&value)), vec!["44", "109"]);
    }

    #[test]
    fn test_parse_id_set_numeric_entries() {
        let value = json!([44, 109]);
        assert_eq!(parse_id_set(Some(&value)), vec!["44", "109"]);
    }

    #[test]
    fn test_parse_id_set_doubly_encoded() {
        let value = json!("[\"price_a\", \"price_b\"]");
        assert_eq!(parse_id_set(Some(&value)), vec!["price_a", "price_b"]);
    }

    #[test]
    fn test_parse_id_set_garbage_is_empty() {
        let value = json!("not json at all");
        assert!(parse_id_set(Some(&value)).is_empty());

        let value = json!({"unexpected": "object"});
        assert!(parse_id_set(Some(&value)).is_empty());

        assert!(parse_id_set(None).is_empty());
    }

    #[test]
    fn test_parse_time_slots() {
        assert_eq!(
            parse_time_slots(Some("13:00, 14:00,15:00")),
            vec!["13:00", "14:00", "15:00"]
        );
        assert!(parse_time_slots(Some("")).is_empty());
        assert!(parse_time_slots(None).is_empty());
    }

    #[test]
    fn test_check_scope_requires_matching_sets() {
        let mut request = CreateRuleRequest {
            rule_date: NaiveDate::from_ymd_opt(2025, 6, 26).unwrap(),
            scope: RuleScope::Branches,
            branch_ids: vec![],
            product_ids: vec![],
            time_slots: vec![],
        };
        assert!(request.check_scope().is_err());

        request.branch_ids = vec!["44".to_string()];
        assert!(request.check_scope().is_ok());

        request.scope = RuleScope::BranchesAndProducts;
        assert!(request.check_scope().is_err());

        request.product_ids = vec!["price_a".to_string()];
        assert!(request.check_scope().is_ok());
    }
}
