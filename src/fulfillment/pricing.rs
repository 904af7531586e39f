// Price and presentation resolver
//
// Static matrices mapping (category, presentation, brand) to canonical prices
// and legacy system identifiers, plus the seasonal special-date table that
// overrides the identifier lookup for promotional dates.

use chrono::{NaiveDate, NaiveTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::fulfillment::routing::Brand;

/// Product category carried on order line items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Pasteles,
    Roscas,
}

impl Category {
    /// Parse a snapshot category string
    ///
    /// Unrecognized values fall back to the default category rather than
    /// failing checkout; the lenient path is logged.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "pasteles" => Category::Pasteles,
            "roscas" => Category::Roscas,
            other => {
                tracing::warn!("Unknown product category '{}', defaulting to pasteles", other);
                Category::Pasteles
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Pasteles => "pasteles",
            Category::Roscas => "roscas",
        }
    }
}

/// Size/packaging variant of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presentation {
    Tradicional,
    Anytime,
    Gift,
}

impl Presentation {
    /// Parse a snapshot presentation string
    ///
    /// Unrecognized values fall back to the default presentation rather than
    /// failing checkout; the lenient path is logged.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "tradicional" => Presentation::Tradicional,
            "anytime" => Presentation::Anytime,
            "gift" => Presentation::Gift,
            other => {
                tracing::warn!(
                    "Unknown presentation '{}', defaulting to tradicional",
                    other
                );
                Presentation::Tradicional
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Presentation::Tradicional => "tradicional",
            Presentation::Anytime => "anytime",
            Presentation::Gift => "gift",
        }
    }
}

/// Canonical price for a (category, presentation) pair, in MXN
pub fn presentation_price(category: Category, presentation: Presentation) -> Decimal {
    let amount: u32 = match (category, presentation) {
        (Category::Pasteles, Presentation::Tradicional) => 1290,
        (Category::Pasteles, Presentation::Anytime) => 620,
        (Category::Pasteles, Presentation::Gift) => 350,
        (Category::Roscas, Presentation::Tradicional) => 980,
        (Category::Roscas, Presentation::Anytime) => 520,
        (Category::Roscas, Presentation::Gift) => 350,
    };
    Decimal::from(amount)
}

/// Promotional discount for a (category, presentation) pair, in MXN
pub fn presentation_discount(category: Category, presentation: Presentation) -> Decimal {
    let amount: u32 = match (category, presentation) {
        (Category::Pasteles, Presentation::Tradicional) => 100,
        (Category::Pasteles, Presentation::Anytime) => 50,
        (Category::Roscas, Presentation::Tradicional) => 80,
        _ => 0,
    };
    Decimal::from(amount)
}

/// Legacy presentation identifier for a (category, presentation, brand) triple
///
/// The two brand tables are disjoint; the POS tenants reject each other's
/// codes, which the tests pin down.
pub fn legacy_presentation_id(
    category: Category,
    presentation: Presentation,
    brand: Brand,
) -> &'static str {
    match (brand, category, presentation) {
        (Brand::Pasteleria, Category::Pasteles, Presentation::Tradicional) => "1",
        (Brand::Pasteleria, Category::Pasteles, Presentation::Anytime) => "2",
        (Brand::Pasteleria, Category::Pasteles, Presentation::Gift) => "3",
        (Brand::Pasteleria, Category::Roscas, Presentation::Tradicional) => "7",
        (Brand::Pasteleria, Category::Roscas, Presentation::Anytime) => "8",
        (Brand::Pasteleria, Category::Roscas, Presentation::Gift) => "9",
        (Brand::Postreria, Category::Pasteles, Presentation::Tradicional) => "33",
        (Brand::Postreria, Category::Pasteles, Presentation::Anytime) => "34",
        (Brand::Postreria, Category::Pasteles, Presentation::Gift) => "35",
        (Brand::Postreria, Category::Roscas, Presentation::Tradicional) => "41",
        (Brand::Postreria, Category::Roscas, Presentation::Anytime) => "42",
        (Brand::Postreria, Category::Roscas, Presentation::Gift) => "43",
    }
}

/// Seasonal date that reroutes product identifiers in the POS upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialDateKind {
    /// December 23rd batch (legacy code "1")
    PreChristmas,
    /// December 24th batch (legacy code "2")
    ChristmasEve,
}

impl SpecialDateKind {
    /// Code the legacy system keys its substitute-id tables on
    pub fn legacy_code(&self) -> &'static str {
        match self {
            SpecialDateKind::PreChristmas => "1",
            SpecialDateKind::ChristmasEve => "2",
        }
    }
}

/// Look up whether a delivery date is on the seasonal allowlist
pub fn special_date_kind(date: NaiveDate) -> Option<SpecialDateKind> {
    const SPECIAL_DATES: [(i32, u32, u32, SpecialDateKind); 2] = [
        (2025, 12, 23, SpecialDateKind::PreChristmas),
        (2025, 12, 24, SpecialDateKind::ChristmasEve),
    ];

    SPECIAL_DATES.iter().find_map(|&(y, m, d, kind)| {
        if NaiveDate::from_ymd_opt(y, m, d) == Some(date) {
            Some(kind)
        } else {
            None
        }
    })
}

/// Check a rosca order against the Día de Reyes delivery window
///
/// Roscas are delivered only on January 5th and 6th, each with its own
/// delivery-time window (both ends inclusive). Orders without a rosca never
/// reach this check.
pub fn check_rosca_window(
    delivery_date: NaiveDate,
    delivery_time: NaiveTime,
) -> Result<(), String> {
    // (year, month, day, opening hour, closing hour)
    const ROSCA_WINDOWS: [(i32, u32, u32, u32, u32); 2] =
        [(2026, 1, 5, 15, 20), (2026, 1, 6, 12, 20)];

    for &(y, m, d, open, close) in &ROSCA_WINDOWS {
        if NaiveDate::from_ymd_opt(y, m, d) != Some(delivery_date) {
            continue;
        }
        let at = (delivery_time.hour(), delivery_time.minute());
        if at >= (open, 0) && at <= (close, 0) {
            return Ok(());
        }
        return Err(format!(
            "Solo se pueden realizar pedidos para el {} entre las {:02}:00 y {:02}:00",
            d, open, close
        ));
    }

    Err("Solo se pueden realizar pedidos de Rosca para los días 5 y 6 de enero.".to_string())
}

/// Substitute POS identifiers for one product, keyed by brand and date kind
///
/// Mirrors the catalog's `special_system_ids` JSONB column; missing entries
/// fall back to the product's standard identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecialSystemIds {
    #[serde(default)]
    pub postreria: SpecialIdPair,
    #[serde(default)]
    pub pasteleria: SpecialIdPair,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecialIdPair {
    #[serde(rename = "1", default, skip_serializing_if = "Option::is_none")]
    pub pre_christmas: Option<String>,
    #[serde(rename = "2", default, skip_serializing_if = "Option::is_none")]
    pub christmas_eve: Option<String>,
}

impl SpecialSystemIds {
    /// Substitute identifier for a (brand, kind) pair, if configured
    pub fn lookup(&self, brand: Brand, kind: SpecialDateKind) -> Option<&str> {
        let pair = match brand {
            Brand::Postreria => &self.postreria,
            Brand::Pasteleria => &self.pasteleria,
        };
        match kind {
            SpecialDateKind::PreChristmas => pair.pre_christmas.as_deref(),
            SpecialDateKind::ChristmasEve => pair.christmas_eve.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_presentation_parse_known_values() {
        assert_eq!(Presentation::parse("tradicional"), Presentation::Tradicional);
        assert_eq!(Presentation::parse("Anytime"), Presentation::Anytime);
        assert_eq!(Presentation::parse(" gift "), Presentation::Gift);
    }

    #[test]
    fn test_presentation_parse_unknown_defaults() {
        assert_eq!(Presentation::parse("jumbo"), Presentation::Tradicional);
        assert_eq!(Presentation::parse(""), Presentation::Tradicional);
    }

    #[test]
    fn test_category_parse_unknown_defaults() {
        assert_eq!(Category::parse("galletas"), Category::Pasteles);
    }

    #[test]
    fn test_presentation_prices() {
        assert_eq!(
            presentation_price(Category::Pasteles, Presentation::Tradicional),
            dec!(1290)
        );
        assert_eq!(
            presentation_price(Category::Pasteles, Presentation::Anytime),
            dec!(620)
        );
        assert_eq!(
            presentation_price(Category::Pasteles, Presentation::Gift),
            dec!(350)
        );
    }

    #[test]
    fn test_discount_never_exceeds_price() {
        for category in [Category::Pasteles, Category::Roscas] {
            for presentation in [
                Presentation::Tradicional,
                Presentation::Anytime,
                Presentation::Gift,
            ] {
                assert!(
                    presentation_discount(category, presentation)
                        < presentation_price(category, presentation)
                );
            }
        }
    }

    #[test]
    fn test_brand_id_tables_are_disjoint() {
        let mut pasteleria_ids = Vec::new();
        let mut postreria_ids = Vec::new();
        for category in [Category::Pasteles, Category::Roscas] {
            for presentation in [
                Presentation::Tradicional,
                Presentation::Anytime,
                Presentation::Gift,
            ] {
                pasteleria_ids.push(legacy_presentation_id(
                    category,
                    presentation,
                    Brand::Pasteleria,
                ));
                postreria_ids.push(legacy_presentation_id(
                    category,
                    presentation,
                    Brand::Postreria,
                ));
            }
        }
        for id in &pasteleria_ids {
            assert!(
                !postreria_ids.contains(id),
                "identifier {} appears in both brand tables",
                id
            );
        }
    }

    #[test]
    fn test_special_date_allowlist() {
        let pre = NaiveDate::from_ymd_opt(2025, 12, 23).unwrap();
        let eve = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap();
        let christmas = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();

        assert_eq!(special_date_kind(pre), Some(SpecialDateKind::PreChristmas));
        assert_eq!(special_date_kind(eve), Some(SpecialDateKind::ChristmasEve));
        assert_eq!(special_date_kind(christmas), None);
    }

    #[test]
    fn test_rosca_window_accepts_reyes_deliveries() {
        let jan5 = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let jan6 = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();

        assert!(check_rosca_window(jan5, NaiveTime::from_hms_opt(15, 0, 0).unwrap()).is_ok());
        assert!(check_rosca_window(jan5, NaiveTime::from_hms_opt(20, 0, 0).unwrap()).is_ok());
        assert!(check_rosca_window(jan6, NaiveTime::from_hms_opt(12, 30, 0).unwrap()).is_ok());
    }

    #[test]
    fn test_rosca_window_rejects_times_outside_window() {
        let jan5 = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let jan6 = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();

        let err =
            check_rosca_window(jan5, NaiveTime::from_hms_opt(14, 59, 0).unwrap()).unwrap_err();
        assert!(err.contains("entre las 15:00 y 20:00"));
        assert!(check_rosca_window(jan6, NaiveTime::from_hms_opt(20, 1, 0).unwrap()).is_err());
    }

    #[test]
    fn test_rosca_window_rejects_other_dates() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        let err = check_rosca_window(date, NaiveTime::from_hms_opt(13, 0, 0).unwrap()).unwrap_err();
        assert!(err.contains("5 y 6 de enero"));
    }

    #[test]
    fn test_special_ids_deserialize_from_catalog_shape() {
        let raw = r#"{"postreria": {"1": "9358", "2": "8358"}, "pasteleria": {"1": "9098"}}"#;
        let ids: SpecialSystemIds = serde_json::from_str(raw).unwrap();

        assert_eq!(
            ids.lookup(Brand::Postreria, SpecialDateKind::PreChristmas),
            Some("9358")
        );
        assert_eq!(
            ids.lookup(Brand::Pasteleria, SpecialDateKind::ChristmasEve),
            None
        );
    }

    #[test]
    fn test_special_ids_default_is_empty() {
        let ids: SpecialSystemIds = serde_json::from_str("{}").unwrap();
        assert_eq!(
            ids.lookup(Brand::Postreria, SpecialDateKind::PreChristmas),
            None
        );
    }
}
