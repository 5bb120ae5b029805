//! The `Record` type and its companions: the income/expense discriminator,
//! the session-scoped record id, and the full-field match criteria used by
//! callers that do not hold an id.

use crate::error::{Error, Result};
use crate::model::Amount;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// The canonical date format of the persisted documents.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a canonical `YYYY-MM-DD` date string.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| Error::Format(format!("expected YYYY-MM-DD, got '{s}'")))
}

/// A single dated income or expense entry.
///
/// The `date` field stays a string in the canonical format because that is
/// how the documents store it; the aggregation engine parses it at use and
/// treats a malformed date as a violated invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Record {
    pub date: String,
    pub amount: Amount,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "bool_or_string")]
    pub recurring: bool,
}

impl Record {
    /// The record's date parsed under the canonical format.
    pub fn parsed_date(&self) -> Result<NaiveDate> {
        parse_date(&self.date)
    }
}

/// Whether a record is income or an expense. Each kind has its own persisted
/// collection and its own category namespace.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Income,
    Expense,
}

serde_plain::derive_display_from_serialize!(RecordKind);
serde_plain::derive_fromstr_from_deserialize!(RecordKind);

/// A synthetic identifier assigned when a record enters the in-memory store.
///
/// Ids are not persisted; the on-disk documents identify records only by
/// their field values, so an id is stable for the lifetime of one `Store`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RecordId(Uuid);

impl RecordId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Locates a record by the exact current values of its displayed fields.
///
/// This is the compatibility shim for callers that lack a `RecordId`: the
/// store matches the first structurally-equal record in storage order. Two
/// records with identical date, amount, category and description are
/// indistinguishable through this interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchFields {
    date: String,
    amount: Amount,
    category: String,
    description: String,
}

impl MatchFields {
    pub fn new(
        date: impl Into<String>,
        amount: Amount,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            amount,
            category: category.into(),
            description: description.into(),
        }
    }

    /// The criteria that would match `record` exactly.
    pub fn for_record(record: &Record) -> Self {
        Self::new(
            record.date.clone(),
            record.amount,
            record.category.clone(),
            record.description.clone(),
        )
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.date == record.date
            && self.amount == record.amount
            && self.category == record.category
            && self.description == record.description
    }
}

/// Accepts a JSON bool, or the strings "true"/"false" (any case) left behind
/// by writers that quoted the flag. Anything else fails the document load.
fn bool_or_string<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct BoolVisitor;

    impl serde::de::Visitor<'_> for BoolVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
            f.write_str("a boolean or the string \"true\" or \"false\"")
        }

        fn visit_bool<E>(self, v: bool) -> std::result::Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(v)
        }

        fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            match v.to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                bad => Err(E::custom(format!("'{bad}' is not a boolean"))),
            }
        }
    }

    deserializer.deserialize_any(BoolVisitor)
}
