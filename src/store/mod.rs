//! The record store: owns the three persisted collections and rewrites them
//! whole after every mutation.
//!
//! The store is created once at process start and exclusively owned. Every
//! mutating operation is all-or-nothing per call: validation and target
//! matching happen before any in-memory change, and a successful mutation
//! immediately persists the affected documents. There is no partial-write
//! protection; a crash mid-write can corrupt a document.

mod loader;

use crate::error::{Error, Result};
use crate::home::Home;
use crate::model::{
    parse_date, Amount, CategoryRegistry, MatchFields, Record, RecordId, RecordKind,
};
use crate::report;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;
use tracing::warn;

const EXPENSES_JSON: &str = "expenses.json";
const INCOME_JSON: &str = "income.json";
const CATEGORIES_JSON: &str = "categories.json";

/// A record plus the synthetic id it was assigned when it entered the store.
///
/// Ids are session-scoped: the documents on disk do not carry them, so a
/// fresh id is assigned at load or add. They are the primary handle for edit
/// and delete; full-field matching exists as a compatibility shim.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    id: RecordId,
    record: Record,
}

impl Entry {
    fn new(record: Record) -> Self {
        Self {
            id: RecordId::new(),
            record,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn record(&self) -> &Record {
        &self.record
    }
}

/// The in-memory owner of the income records, expense records and category
/// registry, bound to the data directory they persist in.
#[derive(Debug)]
pub struct Store {
    home: Home,
    income: Vec<Entry>,
    expenses: Vec<Entry>,
    registry: CategoryRegistry,
    load_issues: Vec<Error>,
}

impl Store {
    /// Loads the three documents from `home`.
    ///
    /// Loading never fails outright: a missing document becomes an empty
    /// default for that document only, and an unreadable or unparseable one
    /// becomes an empty default plus a `LoadError` recorded in
    /// [`Store::load_issues`] and logged at warn level.
    pub fn load(home: Home) -> Store {
        let mut load_issues = Vec::new();
        let expenses = load_records(home.expenses_file(), EXPENSES_JSON, &mut load_issues);
        let income = load_records(home.income_file(), INCOME_JSON, &mut load_issues);
        let registry = match loader::read_document::<CategoryRegistry>(
            home.categories_file(),
            CATEGORIES_JSON,
        ) {
            Ok(Some(registry)) => registry,
            Ok(None) => CategoryRegistry::default(),
            Err(e) => {
                warn!("{e}, falling back to an empty category registry");
                load_issues.push(e);
                CategoryRegistry::default()
            }
        };
        Store {
            home,
            income,
            expenses,
            registry,
            load_issues,
        }
    }

    pub fn home(&self) -> &Home {
        &self.home
    }

    /// The documents that could not be loaded and were replaced by defaults.
    pub fn load_issues(&self) -> &[Error] {
        &self.load_issues
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    /// All entries of one kind in storage order, with their session ids.
    pub fn entries(&self, kind: RecordKind) -> &[Entry] {
        match kind {
            RecordKind::Income => &self.income,
            RecordKind::Expense => &self.expenses,
        }
    }

    /// All records of one kind in storage order.
    pub fn records(&self, kind: RecordKind) -> impl Iterator<Item = &Record> {
        self.entries(kind).iter().map(Entry::record)
    }

    /// The records of one kind whose `recurring` flag is set. This computed
    /// view is the authoritative source for the persisted recurring mirror.
    pub fn recurring_records(&self, kind: RecordKind) -> impl Iterator<Item = &Record> {
        self.records(kind).filter(|r| r.recurring)
    }

    /// The first entry structurally equal to `criteria`, in storage order.
    pub fn find(&self, kind: RecordKind, criteria: &MatchFields) -> Option<&Entry> {
        self.entries(kind).iter().find(|e| criteria.matches(&e.record))
    }

    /// Validates and appends a record, then persists all collections.
    pub fn add(&mut self, kind: RecordKind, record: Record) -> Result<RecordId> {
        validate(&record)?;
        let entry = Entry::new(record);
        let id = entry.id;
        self.entries_mut(kind).push(entry);
        self.persist_all()?;
        Ok(id)
    }

    /// Replaces the first record equal to `criteria` with `new_record`,
    /// keeping its id, then persists all collections.
    pub fn edit(
        &mut self,
        kind: RecordKind,
        criteria: &MatchFields,
        new_record: Record,
    ) -> Result<RecordId> {
        let ix = self.position(kind, criteria)?;
        validate(&new_record)?;
        self.entries_mut(kind)[ix].record = new_record;
        let id = self.entries(kind)[ix].id;
        self.persist_all()?;
        Ok(id)
    }

    /// Replaces the record with the given session id, then persists.
    pub fn edit_by_id(&mut self, kind: RecordKind, id: RecordId, new_record: Record) -> Result<()> {
        let ix = self.position_by_id(kind, id)?;
        validate(&new_record)?;
        self.entries_mut(kind)[ix].record = new_record;
        self.persist_all()
    }

    /// Removes the first record equal to `criteria`, then persists all
    /// collections. Returns the removed record.
    pub fn delete(&mut self, kind: RecordKind, criteria: &MatchFields) -> Result<Record> {
        let ix = self.position(kind, criteria)?;
        let removed = self.entries_mut(kind).remove(ix).record;
        self.persist_all()?;
        Ok(removed)
    }

    /// Removes the record with the given session id, then persists.
    pub fn delete_by_id(&mut self, kind: RecordKind, id: RecordId) -> Result<Record> {
        let ix = self.position_by_id(kind, id)?;
        let removed = self.entries_mut(kind).remove(ix).record;
        self.persist_all()?;
        Ok(removed)
    }

    /// All records of `kind` with `start <= date <= end`, in storage order.
    /// A range with `start > end` matches nothing.
    pub fn query_by_date_range(
        &self,
        kind: RecordKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<&Record>> {
        report::filter_by_date_range(self.records(kind), start, end)
    }

    /// Appends a category name to the list for `kind` and persists the
    /// registry.
    pub fn set_category(&mut self, kind: RecordKind, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::Validation("a category name is required".to_string()));
        }
        self.registry.categories_mut(kind).push(name);
        self.persist_registry()
    }

    /// Removes the category at `index` from the list for `kind` and persists
    /// the registry. Records already using the category are left untouched.
    pub fn remove_category(&mut self, kind: RecordKind, index: usize) -> Result<String> {
        let categories = self.registry.categories_mut(kind);
        if index >= categories.len() {
            return Err(Error::NotFound(format!(
                "there is no {kind} category at index {index}"
            )));
        }
        let removed = categories.remove(index);
        self.persist_registry()?;
        Ok(removed)
    }

    /// Sets the spending limit for a category and persists the registry.
    pub fn set_spending_limit(
        &mut self,
        category: impl Into<String>,
        amount: Amount,
    ) -> Result<()> {
        let category = category.into();
        if category.trim().is_empty() {
            return Err(Error::Validation("a category name is required".to_string()));
        }
        if !amount.is_positive() {
            return Err(Error::Validation(
                "the spending limit must be a positive number".to_string(),
            ));
        }
        self.registry.spending_limits_mut().insert(category, amount);
        self.persist_registry()
    }

    /// Removes the spending limit for a category and persists the registry.
    pub fn remove_spending_limit(&mut self, category: &str) -> Result<Amount> {
        let removed = self
            .registry
            .spending_limits_mut()
            .shift_remove(category)
            .ok_or_else(|| {
                Error::NotFound(format!("there is no spending limit for '{category}'"))
            })?;
        self.persist_registry()?;
        Ok(removed)
    }

    fn entries_mut(&mut self, kind: RecordKind) -> &mut Vec<Entry> {
        match kind {
            RecordKind::Income => &mut self.income,
            RecordKind::Expense => &mut self.expenses,
        }
    }

    fn position(&self, kind: RecordKind, criteria: &MatchFields) -> Result<usize> {
        self.entries(kind)
            .iter()
            .position(|e| criteria.matches(&e.record))
            .ok_or_else(|| Error::NotFound("record not found".to_string()))
    }

    fn position_by_id(&self, kind: RecordKind, id: RecordId) -> Result<usize> {
        self.entries(kind)
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| Error::NotFound(format!("no record with id {id}")))
    }

    fn persist_all(&mut self) -> Result<()> {
        self.persist_records(RecordKind::Income)?;
        self.persist_records(RecordKind::Expense)?;
        self.persist_registry()
    }

    fn persist_records(&self, kind: RecordKind) -> Result<()> {
        let (path, document) = match kind {
            RecordKind::Income => (self.home.income_file(), INCOME_JSON),
            RecordKind::Expense => (self.home.expenses_file(), EXPENSES_JSON),
        };
        let records: Vec<&Record> = self.records(kind).collect();
        write_document(path, document, &records)
    }

    /// Regenerates the recurring mirror from the `recurring` flags and
    /// writes the registry document. Because the mirror is rebuilt every
    /// time, each recurring record appears in it exactly once.
    fn persist_registry(&mut self) -> Result<()> {
        let income: Vec<Record> = self.recurring_records(RecordKind::Income).cloned().collect();
        let expense: Vec<Record> = self
            .recurring_records(RecordKind::Expense)
            .cloned()
            .collect();
        self.registry.set_recurring_mirror(income, expense);
        write_document(self.home.categories_file(), CATEGORIES_JSON, &self.registry)
    }
}

/// Rejects a record that is missing required fields, carries a malformed
/// date, or has a negative amount. Runs before any in-memory change.
fn validate(record: &Record) -> Result<()> {
    if record.date.trim().is_empty() {
        return Err(Error::Validation("a date is required".to_string()));
    }
    if parse_date(&record.date).is_err() {
        return Err(Error::Validation(format!(
            "the date must be in YYYY-MM-DD format, got '{}'",
            record.date
        )));
    }
    if record.category.trim().is_empty() {
        return Err(Error::Validation("a category is required".to_string()));
    }
    if record.amount.is_negative() {
        return Err(Error::Validation(
            "the amount must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn load_records(path: &Path, document: &str, load_issues: &mut Vec<Error>) -> Vec<Entry> {
    match loader::read_document::<Vec<Record>>(path, document) {
        Ok(Some(records)) => records.into_iter().map(Entry::new).collect(),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!("{e}, falling back to an empty collection");
            load_issues.push(e);
            Vec::new()
        }
    }
}

fn write_document<T>(path: &Path, document: &str, value: &T) -> Result<()>
where
    T: Serialize,
{
    let json =
        serde_json::to_string_pretty(value).map_err(|e| Error::persist(document, e))?;
    std::fs::write(path, json).map_err(|e| Error::persist(document, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let home = Home::new(dir.path().join("fintrack")).unwrap();
        (dir, Store::load(home))
    }

    fn record(date: &str, amount: &str, category: &str, description: &str) -> Record {
        Record {
            date: date.to_string(),
            amount: Amount::from_str(amount).unwrap(),
            category: category.to_string(),
            description: description.to_string(),
            recurring: false,
        }
    }

    fn lunch() -> Record {
        record("2024-01-15", "42.50", "Food", "Lunch")
    }

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_load_empty_home() {
        let (_dir, store) = test_store();
        assert_eq!(store.records(RecordKind::Income).count(), 0);
        assert_eq!(store.records(RecordKind::Expense).count(), 0);
        assert!(store.load_issues().is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let (_dir, mut store) = test_store();
        store.add(RecordKind::Expense, lunch()).unwrap();

        let home = store.home().clone();
        drop(store);
        let reloaded = Store::load(home);
        let records: Vec<&Record> = reloaded.records(RecordKind::Expense).collect();
        assert_eq!(records, [&lunch()]);
        assert!(reloaded.load_issues().is_empty());
    }

    #[test]
    fn test_add_validation() {
        let (_dir, mut store) = test_store();

        let missing_date = record("", "10", "Food", "");
        assert!(matches!(
            store.add(RecordKind::Expense, missing_date),
            Err(Error::Validation(_))
        ));

        let bad_date = record("15/01/2024", "10", "Food", "");
        assert!(matches!(
            store.add(RecordKind::Expense, bad_date),
            Err(Error::Validation(_))
        ));

        let missing_category = record("2024-01-15", "10", "", "");
        assert!(matches!(
            store.add(RecordKind::Expense, missing_category),
            Err(Error::Validation(_))
        ));

        let negative = record("2024-01-15", "-10", "Food", "");
        assert!(matches!(
            store.add(RecordKind::Expense, negative),
            Err(Error::Validation(_))
        ));

        // Nothing was mutated or persisted.
        assert_eq!(store.records(RecordKind::Expense).count(), 0);
        assert!(!store.home().expenses_file().exists());
    }

    #[test]
    fn test_add_recurring_appears_in_mirror() {
        let (_dir, mut store) = test_store();
        let mut rent = record("2024-01-01", "800", "Rent", "January rent");
        rent.recurring = true;
        store.add(RecordKind::Expense, rent.clone()).unwrap();

        assert_eq!(
            store.registry().recurring_mirror(RecordKind::Expense),
            [rent.clone()]
        );

        // The mirror is also present in the persisted registry document.
        let reloaded = Store::load(store.home().clone());
        assert_eq!(
            reloaded.registry().recurring_mirror(RecordKind::Expense),
            [rent]
        );
    }

    #[test]
    fn test_edit_not_found() {
        let (_dir, mut store) = test_store();
        store.add(RecordKind::Expense, lunch()).unwrap();
        let criteria = MatchFields::new(
            "2024-01-15",
            Amount::from_str("99.99").unwrap(),
            "Food",
            "Lunch",
        );
        assert!(matches!(
            store.edit(RecordKind::Expense, &criteria, lunch()),
            Err(Error::NotFound(_))
        ));
        assert_eq!(store.records(RecordKind::Expense).count(), 1);
    }

    #[test]
    fn test_edit_flips_recurring_into_mirror_once() {
        let (_dir, mut store) = test_store();
        store.add(RecordKind::Expense, lunch()).unwrap();

        let mut recurring = lunch();
        recurring.recurring = true;
        let criteria = MatchFields::for_record(&lunch());
        store
            .edit(RecordKind::Expense, &criteria, recurring.clone())
            .unwrap();
        assert_eq!(
            store.registry().recurring_mirror(RecordKind::Expense),
            [recurring.clone()]
        );

        // Editing again with recurring unchanged must not create a duplicate.
        let mut renamed = recurring.clone();
        renamed.description = "Team lunch".to_string();
        let criteria = MatchFields::for_record(&recurring);
        store
            .edit(RecordKind::Expense, &criteria, renamed.clone())
            .unwrap();
        assert_eq!(
            store.registry().recurring_mirror(RecordKind::Expense),
            [renamed]
        );
    }

    #[test]
    fn test_edit_clears_recurring_from_mirror() {
        let (_dir, mut store) = test_store();
        let mut recurring = lunch();
        recurring.recurring = true;
        store.add(RecordKind::Expense, recurring.clone()).unwrap();

        let criteria = MatchFields::for_record(&recurring);
        store.edit(RecordKind::Expense, &criteria, lunch()).unwrap();
        assert!(store
            .registry()
            .recurring_mirror(RecordKind::Expense)
            .is_empty());
    }

    #[test]
    fn test_edit_keeps_id() {
        let (_dir, mut store) = test_store();
        let id = store.add(RecordKind::Income, lunch()).unwrap();
        let criteria = MatchFields::for_record(&lunch());
        let edited_id = store
            .edit(
                RecordKind::Income,
                &criteria,
                record("2024-01-16", "50", "Food", "Dinner"),
            )
            .unwrap();
        assert_eq!(id, edited_id);
    }

    #[test]
    fn test_edit_and_delete_by_id() {
        let (_dir, mut store) = test_store();
        let id = store.add(RecordKind::Expense, lunch()).unwrap();
        let replacement = record("2024-02-01", "10", "Food", "Coffee");
        store
            .edit_by_id(RecordKind::Expense, id, replacement.clone())
            .unwrap();
        assert_eq!(store.entries(RecordKind::Expense)[0].record(), &replacement);

        let removed = store.delete_by_id(RecordKind::Expense, id).unwrap();
        assert_eq!(removed, replacement);
        assert!(matches!(
            store.delete_by_id(RecordKind::Expense, id),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_not_found_leaves_collection_unchanged() {
        let (_dir, mut store) = test_store();
        store.add(RecordKind::Expense, lunch()).unwrap();
        let criteria = MatchFields::new(
            "2024-01-15",
            Amount::from_str("42.50").unwrap(),
            "Food",
            "Brunch",
        );
        assert!(matches!(
            store.delete(RecordKind::Expense, &criteria),
            Err(Error::NotFound(_))
        ));
        assert_eq!(store.records(RecordKind::Expense).count(), 1);
    }

    #[test]
    fn test_delete_removes_first_match_and_mirror_entry() {
        let (_dir, mut store) = test_store();
        let mut recurring = lunch();
        recurring.recurring = true;
        store.add(RecordKind::Expense, recurring.clone()).unwrap();
        store.add(RecordKind::Expense, recurring.clone()).unwrap();

        let criteria = MatchFields::for_record(&recurring);
        store.delete(RecordKind::Expense, &criteria).unwrap();
        assert_eq!(store.records(RecordKind::Expense).count(), 1);
        assert_eq!(
            store.registry().recurring_mirror(RecordKind::Expense).len(),
            1
        );
    }

    #[test]
    fn test_query_by_date_range() {
        let (_dir, mut store) = test_store();
        store
            .add(RecordKind::Expense, record("2024-01-31", "1", "Food", "a"))
            .unwrap();
        store
            .add(RecordKind::Expense, record("2024-01-01", "2", "Food", "b"))
            .unwrap();
        store
            .add(RecordKind::Expense, record("2024-02-01", "3", "Food", "c"))
            .unwrap();

        // Inclusive both ends, storage order preserved.
        let matches = store
            .query_by_date_range(RecordKind::Expense, date("2024-01-01"), date("2024-01-31"))
            .unwrap();
        let descriptions: Vec<&str> =
            matches.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(descriptions, ["a", "b"]);

        // A reversed range matches nothing and is not an error.
        let matches = store
            .query_by_date_range(RecordKind::Expense, date("2024-01-31"), date("2024-01-01"))
            .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_partial_load_missing_documents() {
        let dir = TempDir::new().unwrap();
        let home = Home::new(dir.path().join("fintrack")).unwrap();
        std::fs::write(
            home.income_file(),
            r#"[{"date": "2024-01-01", "amount": 1000, "category": "Salary", "description": "", "recurring": false}]"#,
        )
        .unwrap();

        let store = Store::load(home);
        assert_eq!(store.records(RecordKind::Income).count(), 1);
        assert_eq!(store.records(RecordKind::Expense).count(), 0);
        assert!(store.load_issues().is_empty());
    }

    #[test]
    fn test_malformed_document_falls_back_and_surfaces_issue() {
        let dir = TempDir::new().unwrap();
        let home = Home::new(dir.path().join("fintrack")).unwrap();
        std::fs::write(home.expenses_file(), "{{{ not json").unwrap();
        std::fs::write(
            home.income_file(),
            r#"[{"date": "2024-01-01", "amount": 1000, "category": "Salary", "description": "", "recurring": false}]"#,
        )
        .unwrap();

        let store = Store::load(home);
        assert_eq!(store.records(RecordKind::Expense).count(), 0);
        assert_eq!(store.records(RecordKind::Income).count(), 1);
        assert_eq!(store.load_issues().len(), 1);
        assert!(store.load_issues()[0].to_string().contains("expenses.json"));
    }

    #[test]
    fn test_load_coerces_stringly_typed_fields() {
        let dir = TempDir::new().unwrap();
        let home = Home::new(dir.path().join("fintrack")).unwrap();
        std::fs::write(
            home.expenses_file(),
            r#"[{"Date": "2024-01-15", "Amount": "42.50", "Category": "Food", "Description": "Lunch", "Recurring": "true"},]"#,
        )
        .unwrap();

        let store = Store::load(home);
        let records: Vec<&Record> = store.records(RecordKind::Expense).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, Amount::from_str("42.50").unwrap());
        assert!(records[0].recurring);
        assert!(store.load_issues().is_empty());
    }

    #[test]
    fn test_category_management() {
        let (_dir, mut store) = test_store();
        store.set_category(RecordKind::Expense, "Food").unwrap();
        store.set_category(RecordKind::Expense, "Rent").unwrap();
        store.set_category(RecordKind::Income, "Salary").unwrap();
        assert_eq!(
            store.registry().categories(RecordKind::Expense),
            ["Food", "Rent"]
        );

        let removed = store.remove_category(RecordKind::Expense, 0).unwrap();
        assert_eq!(removed, "Food");
        assert_eq!(store.registry().categories(RecordKind::Expense), ["Rent"]);

        assert!(matches!(
            store.remove_category(RecordKind::Expense, 5),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            store.set_category(RecordKind::Expense, "  "),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_removing_category_leaves_records_orphaned() {
        let (_dir, mut store) = test_store();
        store.set_category(RecordKind::Expense, "Food").unwrap();
        store.add(RecordKind::Expense, lunch()).unwrap();
        store.remove_category(RecordKind::Expense, 0).unwrap();

        // The record keeps its now-orphaned category reference.
        assert_eq!(
            store.records(RecordKind::Expense).next().unwrap().category,
            "Food"
        );
    }

    #[test]
    fn test_spending_limits() {
        let (_dir, mut store) = test_store();
        store
            .set_spending_limit("Food", Amount::from_str("300").unwrap())
            .unwrap();

        assert!(matches!(
            store.set_spending_limit("Rent", Amount::from_str("0").unwrap()),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            store.set_spending_limit("Rent", Amount::from_str("-5").unwrap()),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            store.remove_spending_limit("Rent"),
            Err(Error::NotFound(_))
        ));

        let removed = store.remove_spending_limit("Food").unwrap();
        assert_eq!(removed, Amount::from_str("300").unwrap());
        assert!(store.registry().spending_limits().is_empty());
    }

    #[test]
    fn test_find_returns_first_match_in_storage_order() {
        let (_dir, mut store) = test_store();
        let first = store.add(RecordKind::Expense, lunch()).unwrap();
        let _second = store.add(RecordKind::Expense, lunch()).unwrap();

        let found = store
            .find(RecordKind::Expense, &MatchFields::for_record(&lunch()))
            .unwrap();
        assert_eq!(found.id(), first);
    }
}
