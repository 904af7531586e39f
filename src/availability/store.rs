// Availability rule store
//
// Rules are write-once rows keyed by a synthetic uuid. Reads happen on every
// checkout, so the row-to-domain decode lives here and nowhere else.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::availability::error::AvailabilityError;
use crate::availability::models::{
    parse_id_set, parse_time_slots, AvailabilityRule, CreateRuleOutcome, CreateRuleRequest,
    RuleScope,
};

const SELECT_COLUMNS: &str =
    "id, rule_date, scope, day_disabled, branch_ids, product_ids, time_slots, created_at";

/// Raw database row, decoded into `AvailabilityRule` on the way out
#[derive(Debug, sqlx::FromRow)]
struct RuleRow {
    id: Uuid,
    rule_date: NaiveDate,
    scope: RuleScope,
    day_disabled: bool,
    branch_ids: Option<serde_json::Value>,
    product_ids: Option<serde_json::Value>,
    time_slots: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<RuleRow> for AvailabilityRule {
    fn from(row: RuleRow) -> Self {
        AvailabilityRule {
            id: row.id,
            rule_date: row.rule_date,
            scope: row.scope,
            day_disabled: row.day_disabled,
            branch_ids: parse_id_set(row.branch_ids.as_ref()),
            product_ids: parse_id_set(row.product_ids.as_ref()),
            time_slots: parse_time_slots(row.time_slots.as_deref()),
            created_at: row.created_at,
        }
    }
}

/// User-facing confirmation for a newly created rule
const MSG_CREATED: &str = "Fecha bloqueada correctamente";

/// User-facing message when a (date, scope) pair is already blocked
fn duplicate_message(scope: RuleScope) -> &'static str {
    match scope {
        RuleScope::Day => "Ya existe un bloqueo para esta fecha",
        RuleScope::Branches => "Ya existe un bloqueo de sucursales para esta fecha",
        RuleScope::Products => "Ya existe un bloqueo de productos para esta fecha",
        RuleScope::BranchesAndProducts => {
            "Ya existe un bloqueo de productos por sucursal para esta fecha"
        }
    }
}

/// Build the creation outcome for a rule, new or pre-existing
fn creation_outcome(rule: AvailabilityRule, created: bool) -> CreateRuleOutcome {
    let message = if created {
        MSG_CREATED.to_string()
    } else {
        duplicate_message(rule.scope).to_string()
    };
    CreateRuleOutcome {
        rule,
        created,
        message,
    }
}

/// Repository for availability rules
#[derive(Clone)]
pub struct RuleStore {
    pool: PgPool,
}

impl RuleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All rules for one date, oldest first
    ///
    /// Creation order is the tie-break the evaluator relies on when more than
    /// one rule could match an item.
    pub async fn rules_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<AvailabilityRule>, AvailabilityError> {
        let rows = sqlx::query_as::<_, RuleRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM availability_rules WHERE rule_date = $1 ORDER BY created_at ASC"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AvailabilityRule::from).collect())
    }

    /// All rules, for the admin dashboard, newest first
    pub async fn list_rules(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<Vec<AvailabilityRule>, AvailabilityError> {
        let rows = match date {
            Some(date) => {
                sqlx::query_as::<_, RuleRow>(&format!(
                    "SELECT {SELECT_COLUMNS} FROM availability_rules WHERE rule_date = $1 ORDER BY created_at DESC"
                ))
                .bind(date)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, RuleRow>(&format!(
                    "SELECT {SELECT_COLUMNS} FROM availability_rules ORDER BY rule_date DESC, created_at DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(AvailabilityRule::from).collect())
    }

    /// Create a rule, or report the existing one for the same (date, scope)
    ///
    /// Check-then-insert; the race window is acceptable for an admin-only
    /// write path, and a duplicate rule is harmless to the evaluator.
    pub async fn create_rule(
        &self,
        request: CreateRuleRequest,
    ) -> Result<CreateRuleOutcome, AvailabilityError> {
        request
            .check_scope()
            .map_err(AvailabilityError::ValidationError)?;

        let existing = sqlx::query_as::<_, RuleRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM availability_rules WHERE rule_date = $1 AND scope = $2 LIMIT 1"
        ))
        .bind(request.rule_date)
        .bind(request.scope)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = existing {
            return Ok(creation_outcome(row.into(), false));
        }

        let branch_ids = serde_json::to_value(&request.branch_ids).unwrap_or_default();
        let product_ids = serde_json::to_value(&request.product_ids).unwrap_or_default();
        let time_slots = if request.time_slots.is_empty() {
            None
        } else {
            Some(request.time_slots.join(","))
        };

        let row = sqlx::query_as::<_, RuleRow>(&format!(
            r#"
            INSERT INTO availability_rules
                (id, rule_date, scope, day_disabled, branch_ids, product_ids, time_slots)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(request.rule_date)
        .bind(request.scope)
        .bind(request.scope == RuleScope::Day)
        .bind(branch_ids)
        .bind(product_ids)
        .bind(time_slots)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            rule_date = %request.rule_date,
            scope = %request.scope,
            "Availability rule created"
        );

        Ok(creation_outcome(row.into(), true))
    }

    /// Delete a rule by id
    pub async fn delete_rule(&self, id: Uuid) -> Result<(), AvailabilityError> {
        let result = sqlx::query("DELETE FROM availability_rules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AvailabilityError::NotFound);
        }

        tracing::info!(rule_id = %id, "Availability rule deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(scope: RuleScope) -> AvailabilityRule {
        AvailabilityRule {
            id: Uuid::new_v4(),
            rule_date: NaiveDate::from_ymd_opt(2025, 6, 26).unwrap(),
            scope,
            day_disabled: scope == RuleScope::Day,
            branch_ids: vec!["44".to_string()],
            product_ids: vec!["price_a".to_string()],
            time_slots: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_rule_outcome_is_created() {
        let outcome = creation_outcome(rule(RuleScope::Branches), true);
        assert!(outcome.created);
        assert_eq!(outcome.message, "Fecha bloqueada correctamente");
    }

    #[test]
    fn test_duplicate_rule_outcome_keeps_existing_rule() {
        let existing = rule(RuleScope::Branches);
        let existing_id = existing.id;

        let outcome = creation_outcome(existing, false);
        assert!(!outcome.created);
        assert_eq!(outcome.rule.id, existing_id);
        assert_eq!(
            outcome.message,
            "Ya existe un bloqueo de sucursales para esta fecha"
        );
    }

    #[test]
    fn test_duplicate_message_names_the_blocked_scope() {
        assert_eq!(
            duplicate_message(RuleScope::Day),
            "Ya existe un bloqueo para esta fecha"
        );
        assert_eq!(
            duplicate_message(RuleScope::Products),
            "Ya existe un bloqueo de productos para esta fecha"
        );
        assert_eq!(
            duplicate_message(RuleScope::BranchesAndProducts),
            "Ya existe un bloqueo de productos por sucursal para esta fecha"
        );
    }
}
