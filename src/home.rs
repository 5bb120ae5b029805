use crate::Result;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

const EXPENSES_JSON: &str = "expenses.json";
const INCOME_JSON: &str = "income.json";
const CATEGORIES_JSON: &str = "categories.json";

/// The `Home` object represents the file paths of the `$FINTRACK_HOME`
/// directory: the three persisted documents live directly inside it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Home {
    root: PathBuf,
    expenses: PathBuf,
    income: PathBuf,
    categories: PathBuf,
}

impl Home {
    /// This will create the `fintrack_home` directory, if it does not exist,
    /// and canonicalize itself.
    pub fn new(fintrack_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = fintrack_home.into();
        fs::create_dir_all(&maybe_relative)
            .with_context(|| {
                format!(
                    "Unable to create the data directory {}",
                    maybe_relative.display()
                )
            })
            .map_err(into_persist)?;
        let root = fs::canonicalize(&maybe_relative)
            .with_context(|| {
                format!("Unable to canonicalize the path {}", maybe_relative.display())
            })
            .map_err(into_persist)?;
        Ok(Self {
            expenses: root.join(EXPENSES_JSON),
            income: root.join(INCOME_JSON),
            categories: root.join(CATEGORIES_JSON),
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn expenses_file(&self) -> &Path {
        &self.expenses
    }

    pub fn income_file(&self) -> &Path {
        &self.income
    }

    pub fn categories_file(&self) -> &Path {
        &self.categories
    }
}

fn into_persist(e: anyhow::Error) -> crate::Error {
    crate::Error::Persist {
        document: "data directory".to_string(),
        source: e.into(),
    }
}
