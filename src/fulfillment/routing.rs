// Branch routing rules
//
// Classifies branches into the two legacy back-office tenants and enforces
// per-branch ordering cutoffs. The whole table is configuration so branches
// can be added or reclassified without touching the evaluator.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// Legacy back-office tenant a branch reports into
///
/// Both tenants share one upload endpoint but require brand-specific product
/// codes, so the classification drives the product-id tables in pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Brand {
    /// Bakery-counter tenant ("pastelería")
    Pasteleria,
    /// General-store tenant ("postrería"); the default for unknown branches
    Postreria,
}

impl Brand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Brand::Pasteleria => "pasteleria",
            Brand::Postreria => "postreria",
        }
    }
}

impl std::fmt::Display for Brand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordering cutoff applied to a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CutoffPolicy {
    /// Ordering on Saturday for delivery the next day (Sunday) is rejected
    SaturdayBlocksSunday,
    /// Past the cutoff time, the minimum delivery date shifts one day later
    /// (from next-day to the day after next)
    Evening { hour: u32, minute: u32 },
}

/// Per-branch fulfillment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchPolicy {
    pub brand: Brand,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff: Option<CutoffPolicy>,
}

/// Table-driven branch routing configuration
///
/// Loaded from JSON at startup or built from the deployed default set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingTable {
    branches: HashMap<String, BranchPolicy>,
}

impl Default for RoutingTable {
    fn default() -> Self {
        let mut branches = HashMap::new();
        branches.insert(
            "44".to_string(),
            BranchPolicy {
                brand: Brand::Postreria,
                cutoff: Some(CutoffPolicy::Evening { hour: 21, minute: 0 }),
            },
        );
        branches.insert(
            "106".to_string(),
            BranchPolicy {
                brand: Brand::Postreria,
                cutoff: Some(CutoffPolicy::Evening { hour: 21, minute: 30 }),
            },
        );
        branches.insert(
            "50".to_string(),
            BranchPolicy {
                brand: Brand::Postreria,
                cutoff: Some(CutoffPolicy::SaturdayBlocksSunday),
            },
        );
        branches.insert(
            "109".to_string(),
            BranchPolicy {
                brand: Brand::Postreria,
                cutoff: Some(CutoffPolicy::SaturdayBlocksSunday),
            },
        );
        branches.insert(
            "520".to_string(),
            BranchPolicy {
                brand: Brand::Pasteleria,
                cutoff: Some(CutoffPolicy::SaturdayBlocksSunday),
            },
        );
        branches.insert(
            "536".to_string(),
            BranchPolicy {
                brand: Brand::Pasteleria,
                cutoff: None,
            },
        );
        Self { branches }
    }
}

impl RoutingTable {
    pub fn new(branches: HashMap<String, BranchPolicy>) -> Self {
        Self { branches }
    }

    /// Load a routing table from a JSON file
    pub fn from_file(path: &str) -> Result<Self, String> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read routing table {}: {}", path, e))?;
        serde_json::from_str(&raw)
            .map_err(|e| format!("Failed to parse routing table {}: {}", path, e))
    }

    /// Classify a branch into its back-office brand
    ///
    /// Unknown branches settle into the general-store tenant.
    pub fn classify(&self, branch_id: &str) -> Brand {
        self.branches
            .get(branch_id)
            .map(|policy| policy.brand)
            .unwrap_or(Brand::Postreria)
    }

    /// Check a requested delivery date against the branch's cutoff policy
    ///
    /// `now` is the current moment in the bakery's local timezone. Returns a
    /// user-facing message when the request violates the branch's cutoff.
    pub fn check_order_time(
        &self,
        branch_id: &str,
        delivery_date: NaiveDate,
        now: DateTime<FixedOffset>,
    ) -> Result<(), String> {
        let Some(policy) = self.branches.get(branch_id) else {
            return Ok(());
        };
        let Some(cutoff) = policy.cutoff else {
            return Ok(());
        };

        let today = now.date_naive();

        match cutoff {
            CutoffPolicy::SaturdayBlocksSunday => {
                let next_day = today + Duration::days(1);
                if today.weekday() == Weekday::Sat
                    && delivery_date == next_day
                    && delivery_date.weekday() == Weekday::Sun
                {
                    return Err(
                        "Esta sucursal no recibe pedidos el sábado para entrega el domingo"
                            .to_string(),
                    );
                }
                Ok(())
            }
            CutoffPolicy::Evening { hour, minute } => {
                let past_cutoff = (now.hour(), now.minute()) >= (hour, minute);
                let min_days = if past_cutoff { 2 } else { 1 };
                if delivery_date < today + Duration::days(min_days) {
                    return Err(format!(
                        "Los pedidos realizados después de las {:02}:{:02} requieren un día adicional de anticipación",
                        hour, minute
                    ));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(6 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_classify_bakery_counter_branches() {
        let table = RoutingTable::default();
        assert_eq!(table.classify("520"), Brand::Pasteleria);
        assert_eq!(table.classify("536"), Brand::Pasteleria);
    }

    #[test]
    fn test_classify_defaults_to_postreria() {
        let table = RoutingTable::default();
        assert_eq!(table.classify("44"), Brand::Postreria);
        assert_eq!(table.classify("109"), Brand::Postreria);
        assert_eq!(table.classify("999"), Brand::Postreria);
    }

    #[test]
    fn test_saturday_blocks_next_sunday() {
        let table = RoutingTable::default();
        // 2025-06-21 is a Saturday, 2025-06-22 the following Sunday
        let saturday = local(2025, 6, 21, 10, 0);
        let result = table.check_order_time("109", date(2025, 6, 22), saturday);
        assert!(result.is_err());
    }

    #[test]
    fn test_friday_allows_same_sunday() {
        let table = RoutingTable::default();
        // 2025-06-20 is a Friday
        let friday = local(2025, 6, 20, 10, 0);
        assert!(table
            .check_order_time("109", date(2025, 6, 22), friday)
            .is_ok());
    }

    #[test]
    fn test_saturday_allows_later_dates() {
        let table = RoutingTable::default();
        let saturday = local(2025, 6, 21, 10, 0);
        // The Sunday one week out is not the next calendar day
        assert!(table
            .check_order_time("109", date(2025, 6, 29), saturday)
            .is_ok());
    }

    #[test]
    fn test_evening_cutoff_shifts_minimum_date() {
        let table = RoutingTable::default();
        let before_cutoff = local(2025, 6, 23, 20, 59);
        let after_cutoff = local(2025, 6, 23, 21, 0);

        // Next-day delivery is fine before 21:00 at branch 44
        assert!(table
            .check_order_time("44", date(2025, 6, 24), before_cutoff)
            .is_ok());
        // At or past 21:00 it needs one more day
        assert!(table
            .check_order_time("44", date(2025, 6, 24), after_cutoff)
            .is_err());
        assert!(table
            .check_order_time("44", date(2025, 6, 25), after_cutoff)
            .is_ok());
    }

    #[test]
    fn test_unknown_branch_has_no_cutoff() {
        let table = RoutingTable::default();
        let late = local(2025, 6, 23, 23, 59);
        assert!(table
            .check_order_time("999", date(2025, 6, 24), late)
            .is_ok());
    }

    #[test]
    fn test_routing_table_round_trips_through_json() {
        let table = RoutingTable::default();
        let json = serde_json::to_string(&table).unwrap();
        let parsed: RoutingTable = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.classify("520"), Brand::Pasteleria);
        assert_eq!(parsed.classify("44"), Brand::Postreria);
    }
}
