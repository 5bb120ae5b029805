//! Handlers for category and spending limit management.

use crate::commands::{money, Out};
use crate::model::{Amount, RecordKind};
use crate::Store;
use anyhow::Result;
use indexmap::IndexMap;

pub fn category_add(
    store: &mut Store,
    kind: RecordKind,
    name: &str,
) -> Result<Out<Vec<String>>> {
    store.set_category(kind, name)?;
    Ok(Out::new(
        format!("Added {kind} category '{name}'"),
        store.registry().categories(kind).to_vec(),
    ))
}

pub fn category_remove(
    store: &mut Store,
    kind: RecordKind,
    index: usize,
) -> Result<Out<Vec<String>>> {
    let removed = store.remove_category(kind, index)?;
    Ok(Out::new(
        format!("Removed {kind} category '{removed}'"),
        store.registry().categories(kind).to_vec(),
    ))
}

pub fn category_list(store: &Store, kind: RecordKind) -> Result<Out<Vec<String>>> {
    let categories = store.registry().categories(kind).to_vec();
    let message = if categories.is_empty() {
        format!("No {kind} categories configured.")
    } else {
        let mut message = format!("{} {kind} categories:", categories.len());
        for (index, name) in categories.iter().enumerate() {
            message.push_str(&format!("\n{index}: {name}"));
        }
        message
    };
    Ok(Out::new(message, categories))
}

pub fn limit_set(
    store: &mut Store,
    category: &str,
    amount: Amount,
) -> Result<Out<IndexMap<String, Amount>>> {
    store.set_spending_limit(category, amount)?;
    Ok(Out::new(
        format!("Set the spending limit for {category} to {amount}"),
        store.registry().spending_limits().clone(),
    ))
}

pub fn limit_remove(store: &mut Store, category: &str) -> Result<Out<IndexMap<String, Amount>>> {
    let removed = store.remove_spending_limit(category)?;
    Ok(Out::new(
        format!("Removed the {removed} spending limit for {category}"),
        store.registry().spending_limits().clone(),
    ))
}

pub fn limit_list(store: &Store) -> Result<Out<IndexMap<String, Amount>>> {
    let limits = store.registry().spending_limits().clone();
    let message = if limits.is_empty() {
        "No spending limits set.".to_string()
    } else {
        let mut message = format!("{} spending limit(s):", limits.len());
        for (category, amount) in &limits {
            message.push_str(&format!("\n{category}: {}", money(amount.value())));
        }
        message
    };
    Ok(Out::new(message, limits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::home::Home;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let home = Home::new(dir.path().join("fintrack")).unwrap();
        (dir, Store::load(home))
    }

    #[test]
    fn test_category_lifecycle() {
        let (_dir, mut store) = test_store();
        category_add(&mut store, RecordKind::Expense, "Food").unwrap();
        category_add(&mut store, RecordKind::Expense, "Rent").unwrap();

        let out = category_list(&store, RecordKind::Expense).unwrap();
        assert_eq!(out.structure().unwrap(), &["Food", "Rent"]);
        assert!(out.message().contains("0: Food"));

        let out = category_remove(&mut store, RecordKind::Expense, 0).unwrap();
        assert_eq!(out.structure().unwrap(), &["Rent"]);
    }

    #[test]
    fn test_limit_lifecycle() {
        let (_dir, mut store) = test_store();
        limit_set(&mut store, "Food", Amount::from_str("300").unwrap()).unwrap();

        let out = limit_list(&store).unwrap();
        assert!(out.message().contains("Food: $300.00"));

        limit_remove(&mut store, "Food").unwrap();
        let out = limit_list(&store).unwrap();
        assert_eq!(out.message(), "No spending limits set.");
    }
}
