//! Writes filtered record snapshots to files in a chosen format.

use crate::model::Record;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The file formats an export can be requested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Xlsx,
}

serde_plain::derive_display_from_serialize!(ExportFormat);
serde_plain::derive_fromstr_from_deserialize!(ExportFormat);

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
struct ExportDocument<'a> {
    income: &'a [&'a Record],
    expenses: &'a [&'a Record],
}

/// Writes the given records into `out_dir` and returns the paths written.
///
/// JSON produces a single `records.json` with both collections, written even
/// when both are empty. CSV produces `income_records.csv` and
/// `expense_records.csv`, skipping a file when its collection is empty.
/// XLSX is recognized but not supported and always errors.
pub fn export(
    income: &[&Record],
    expenses: &[&Record],
    format: ExportFormat,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    debug!(
        "exporting {} income and {} expense records as {format} to {}",
        income.len(),
        expenses.len(),
        out_dir.display()
    );
    match format {
        ExportFormat::Json => export_json(income, expenses, out_dir),
        ExportFormat::Csv => export_csv(income, expenses, out_dir),
        ExportFormat::Xlsx => bail!("the xlsx format is not supported"),
    }
}

fn export_json(income: &[&Record], expenses: &[&Record], out_dir: &Path) -> Result<Vec<PathBuf>> {
    let path = out_dir.join("records.json");
    let document = ExportDocument { income, expenses };
    let json = serde_json::to_string_pretty(&document)?;
    std::fs::write(&path, json)
        .with_context(|| format!("Unable to write {}", path.display()))?;
    Ok(vec![path])
}

fn export_csv(income: &[&Record], expenses: &[&Record], out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (records, filename) in [(income, "income_records.csv"), (expenses, "expense_records.csv")]
    {
        if records.is_empty() {
            continue;
        }
        let path = out_dir.join(filename);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Unable to create {}", path.display()))?;
        for record in records {
            writer.serialize(record)?;
        }
        writer
            .flush()
            .with_context(|| format!("Unable to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
