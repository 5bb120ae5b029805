//! Handler for the export command.

use crate::args::ExportArgs;
use crate::commands::Out;
use crate::export;
use crate::model::{parse_date, RecordKind};
use crate::Store;
use anyhow::Result;
use std::path::PathBuf;

/// Exports the records in the requested date range.
pub fn export(store: &Store, args: &ExportArgs) -> Result<Out<Vec<PathBuf>>> {
    let start = parse_date(args.range().start())?;
    let end = parse_date(args.range().end())?;
    let income = store.query_by_date_range(RecordKind::Income, start, end)?;
    let expenses = store.query_by_date_range(RecordKind::Expense, start, end)?;

    let written = export::export(&income, &expenses, args.format(), args.out_dir())?;
    let message = if written.is_empty() {
        "No records in the range; nothing was written.".to_string()
    } else {
        let mut message = format!("Wrote {} file(s):", written.len());
        for path in &written {
            message.push_str(&format!("\n{}", path.display()));
        }
        message
    };
    Ok(Out::new(message, written))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::home::Home;
    use crate::model::{Amount, Record};
    use clap::Parser;
    use std::str::FromStr;
    use tempfile::TempDir;

    #[test]
    fn test_export_filters_by_range() {
        let dir = TempDir::new().unwrap();
        let home = Home::new(dir.path().join("fintrack")).unwrap();
        let mut store = Store::load(home);
        for date in ["2024-01-15", "2025-06-01"] {
            store
                .add(
                    RecordKind::Expense,
                    Record {
                        date: date.to_string(),
                        amount: Amount::from_str("10").unwrap(),
                        category: "Food".to_string(),
                        description: String::new(),
                        recurring: false,
                    },
                )
                .unwrap();
        }

        let out_dir = dir.path().join("out");
        std::fs::create_dir(&out_dir).unwrap();
        let args = ExportArgs::try_parse_from([
            "export",
            "json",
            "--start",
            "2024-01-01",
            "--end",
            "2024-12-31",
            "--out-dir",
            out_dir.to_str().unwrap(),
        ])
        .unwrap();

        let out = export(&store, &args).unwrap();
        let written = out.structure().unwrap();
        let text = std::fs::read_to_string(&written[0]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["expenses"].as_array().unwrap().len(), 1);
        assert_eq!(value["expenses"][0]["date"], "2024-01-15");
    }
}
