//! The category registry: legal category names per record kind, spending
//! limits, and the persisted recurring mirror.

use crate::model::{Amount, Record, RecordKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The set of valid category names per record kind, plus spending limits and
/// the recurring mirror.
///
/// The `spending_limits` map is keyed by bare category name with no kind
/// restriction; conceptually limits apply to expense categories. The map
/// preserves insertion order so reports list limits in the order they were
/// configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CategoryRegistry {
    #[serde(default)]
    income: Vec<String>,
    #[serde(default)]
    expense: Vec<String>,
    #[serde(default)]
    spending_limits: IndexMap<String, Amount>,
    #[serde(default)]
    recurring: RecurringMirror,
}

impl CategoryRegistry {
    /// The category name list for one record kind.
    pub fn categories(&self, kind: RecordKind) -> &[String] {
        match kind {
            RecordKind::Income => &self.income,
            RecordKind::Expense => &self.expense,
        }
    }

    pub(crate) fn categories_mut(&mut self, kind: RecordKind) -> &mut Vec<String> {
        match kind {
            RecordKind::Income => &mut self.income,
            RecordKind::Expense => &mut self.expense,
        }
    }

    pub fn spending_limits(&self) -> &IndexMap<String, Amount> {
        &self.spending_limits
    }

    pub(crate) fn spending_limits_mut(&mut self) -> &mut IndexMap<String, Amount> {
        &mut self.spending_limits
    }

    /// Replaces the recurring mirror before the registry is written out.
    ///
    /// The mirror is denormalized data kept only for file-format
    /// compatibility; in memory the authoritative view is the `recurring`
    /// flag on the primary collections, and the store regenerates this
    /// mirror from those flags on every save.
    pub(crate) fn set_recurring_mirror(&mut self, income: Vec<Record>, expense: Vec<Record>) {
        self.recurring = RecurringMirror { income, expense };
    }

    /// The recurring mirror as loaded or last regenerated.
    pub fn recurring_mirror(&self, kind: RecordKind) -> &[Record] {
        match kind {
            RecordKind::Income => &self.recurring.income,
            RecordKind::Expense => &self.recurring.expense,
        }
    }
}

/// Lists of record snapshots whose `recurring` flag is true, one per kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
struct RecurringMirror {
    #[serde(default)]
    income: Vec<Record>,
    #[serde(default)]
    expense: Vec<Record>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_deserialize_full_document() {
        let json = r#"{
            "income": ["Salary"],
            "expense": ["Food", "Rent"],
            "spending_limits": {"Food": 300},
            "recurring": {"income": [], "expense": []}
        }"#;
        let registry: CategoryRegistry = serde_json::from_str(json).unwrap();
        assert_eq!(registry.categories(RecordKind::Income), ["Salary"]);
        assert_eq!(registry.categories(RecordKind::Expense), ["Food", "Rent"]);
        assert_eq!(
            registry.spending_limits().get("Food"),
            Some(&Amount::from_str("300").unwrap())
        );
    }

    #[test]
    fn test_deserialize_missing_sections_default() {
        let registry: CategoryRegistry = serde_json::from_str(r#"{"income": ["Salary"]}"#).unwrap();
        assert!(registry.categories(RecordKind::Expense).is_empty());
        assert!(registry.spending_limits().is_empty());
        assert!(registry.recurring_mirror(RecordKind::Income).is_empty());
    }

    #[test]
    fn test_limit_coerced_from_string() {
        let registry: CategoryRegistry =
            serde_json::from_str(r#"{"spending_limits": {"Food": "300.50"}}"#).unwrap();
        assert_eq!(
            registry.spending_limits().get("Food"),
            Some(&Amount::from_str("300.50").unwrap())
        );
    }
}
