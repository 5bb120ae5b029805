//! These structs provide the CLI interface for the fintrack CLI.

use crate::export::ExportFormat;
use crate::model::{Amount, RecordKind};
use clap::{Parser, Subcommand};
use log::{error, LevelFilter};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// fintrack: A command-line personal finance tracker.
///
/// Income and expense records are stored as JSON documents in a local data
/// directory, along with category names, per-category spending limits and a
/// mirror of recurring records. Subcommands add, edit, delete and list
/// records, manage categories and limits, and compute spending reports over
/// date ranges.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Add an income or expense record.
    Add(AddArgs),
    /// Edit the record matching the given fields, replacing the fields for
    /// which a --new-* option is provided.
    Edit(EditArgs),
    /// Delete the record matching the given fields.
    Delete(DeleteArgs),
    /// List records, optionally restricted to a date range.
    List(ListArgs),
    /// Manage the category names for income or expense records.
    Category(CategoryArgs),
    /// Manage per-category monthly spending limits.
    Limit(LimitArgs),
    /// Compute spending reports over a date range.
    Report(ReportArgs),
    /// Show remaining budget per spending limit for the current month.
    Budget,
    /// Export records in a date range to files.
    Export(ExportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// none, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,

    /// The directory where fintrack data is held. Defaults to ~/fintrack
    #[arg(long, env = "FINTRACK_HOME", default_value_t = default_fintrack_home())]
    fintrack_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, fintrack_home: PathBuf) -> Self {
        Self {
            log_level,
            fintrack_home: fintrack_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn fintrack_home(&self) -> &DisplayPath {
        &self.fintrack_home
    }
}

/// Args for the `fintrack add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The kind of record: "income" or "expense"
    kind: RecordKind,

    /// The date of the record, YYYY-MM-DD
    #[arg(long)]
    date: String,

    /// The amount, e.g. 42.50 or $1,000
    #[arg(long)]
    amount: Amount,

    /// The category name
    #[arg(long)]
    category: String,

    /// A free-form description
    #[arg(long, default_value = "")]
    description: String,

    /// Mark the record as recurring
    #[arg(long)]
    recurring: bool,
}

impl AddArgs {
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn recurring(&self) -> bool {
        self.recurring
    }
}

/// Args for the `fintrack edit` command. The four match fields identify the
/// record; the --new-* options carry the replacement values.
#[derive(Debug, Parser, Clone)]
pub struct EditArgs {
    /// The kind of record: "income" or "expense"
    kind: RecordKind,

    /// The date of the record to edit, YYYY-MM-DD
    #[arg(long)]
    date: String,

    /// The amount of the record to edit
    #[arg(long)]
    amount: Amount,

    /// The category of the record to edit
    #[arg(long)]
    category: String,

    /// The description of the record to edit
    #[arg(long, default_value = "")]
    description: String,

    /// The replacement date, if it should change
    #[arg(long)]
    new_date: Option<String>,

    /// The replacement amount, if it should change
    #[arg(long)]
    new_amount: Option<Amount>,

    /// The replacement category, if it should change
    #[arg(long)]
    new_category: Option<String>,

    /// The replacement description, if it should change
    #[arg(long)]
    new_description: Option<String>,

    /// The replacement recurring flag, if it should change
    #[arg(long)]
    new_recurring: Option<bool>,
}

impl EditArgs {
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn new_date(&self) -> Option<&str> {
        self.new_date.as_deref()
    }

    pub fn new_amount(&self) -> Option<Amount> {
        self.new_amount
    }

    pub fn new_category(&self) -> Option<&str> {
        self.new_category.as_deref()
    }

    pub fn new_description(&self) -> Option<&str> {
        self.new_description.as_deref()
    }

    pub fn new_recurring(&self) -> Option<bool> {
        self.new_recurring
    }
}

/// Args for the `fintrack delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The kind of record: "income" or "expense"
    kind: RecordKind,

    /// The date of the record to delete, YYYY-MM-DD
    #[arg(long)]
    date: String,

    /// The amount of the record to delete
    #[arg(long)]
    amount: Amount,

    /// The category of the record to delete
    #[arg(long)]
    category: String,

    /// The description of the record to delete
    #[arg(long, default_value = "")]
    description: String,
}

impl DeleteArgs {
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Args for the `fintrack list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    /// The kind of record: "income" or "expense"
    kind: RecordKind,

    /// Only list records on or after this date, YYYY-MM-DD
    #[arg(long)]
    start: Option<String>,

    /// Only list records on or before this date, YYYY-MM-DD
    #[arg(long)]
    end: Option<String>,
}

impl ListArgs {
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    pub fn end(&self) -> Option<&str> {
        self.end.as_deref()
    }
}

/// Args for the `fintrack category` command.
#[derive(Debug, Parser, Clone)]
pub struct CategoryArgs {
    #[command(subcommand)]
    action: CategoryAction,
}

impl CategoryArgs {
    pub fn action(&self) -> &CategoryAction {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum CategoryAction {
    /// Add a category name.
    Add {
        /// The kind of record the category applies to
        kind: RecordKind,
        /// The category name
        name: String,
    },
    /// Remove the category at the given position.
    Remove {
        /// The kind of record the category applies to
        kind: RecordKind,
        /// The zero-based position in the category list
        index: usize,
    },
    /// List the category names.
    List {
        /// The kind of record to list categories for
        kind: RecordKind,
    },
}

/// Args for the `fintrack limit` command.
#[derive(Debug, Parser, Clone)]
pub struct LimitArgs {
    #[command(subcommand)]
    action: LimitAction,
}

impl LimitArgs {
    pub fn action(&self) -> &LimitAction {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum LimitAction {
    /// Set the monthly spending limit for a category.
    Set {
        /// The category name
        category: String,
        /// The limit amount, must be positive
        amount: Amount,
    },
    /// Remove the spending limit for a category.
    Remove {
        /// The category name
        category: String,
    },
    /// List the configured spending limits.
    List,
}

/// Args for the `fintrack report` command.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    #[command(subcommand)]
    report: ReportKind,
}

impl ReportArgs {
    pub fn report(&self) -> &ReportKind {
        &self.report
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ReportKind {
    /// Spending and income totals per category, with the highest and lowest
    /// spending categories called out.
    Categories(RangeArgs),
    /// Income versus spending totals per month.
    Months(RangeArgs),
    /// A per-month breakdown of totals by category.
    ByCategory(RangeArgs),
}

/// A date range shared by the report subcommands.
#[derive(Debug, Parser, Clone)]
pub struct RangeArgs {
    /// The first date of the range, YYYY-MM-DD
    #[arg(long)]
    start: String,

    /// The last date of the range, YYYY-MM-DD
    #[arg(long)]
    end: String,
}

impl RangeArgs {
    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }
}

/// Args for the `fintrack export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// The output format: "csv", "json" or "xlsx"
    format: ExportFormat,

    #[clap(flatten)]
    range: RangeArgs,

    /// The directory to write the export files into
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

impl ExportArgs {
    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn range(&self) -> &RangeArgs {
        &self.range
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}

fn default_fintrack_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("fintrack"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --fintrack-home or FINTRACK_HOME instead of relying on the \
                default fintrack home directory. If you continue using the program right now, \
                you may have problems!",
            );
            PathBuf::from("fintrack")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let args = Args::try_parse_from([
            "fintrack",
            "add",
            "expense",
            "--date",
            "2024-01-15",
            "--amount",
            "42.50",
            "--category",
            "Food",
            "--description",
            "Lunch",
            "--recurring",
        ])
        .unwrap();
        let Command::Add(add) = args.command() else {
            panic!("expected add");
        };
        assert_eq!(add.kind(), RecordKind::Expense);
        assert_eq!(add.date(), "2024-01-15");
        assert_eq!(add.amount().to_string(), "$42.50");
        assert_eq!(add.category(), "Food");
        assert_eq!(add.description(), "Lunch");
        assert!(add.recurring());
    }

    #[test]
    fn test_parse_report_months() {
        let args = Args::try_parse_from([
            "fintrack",
            "report",
            "months",
            "--start",
            "2024-01-01",
            "--end",
            "2024-12-31",
        ])
        .unwrap();
        let Command::Report(report) = args.command() else {
            panic!("expected report");
        };
        let ReportKind::Months(range) = report.report() else {
            panic!("expected months");
        };
        assert_eq!(range.start(), "2024-01-01");
        assert_eq!(range.end(), "2024-12-31");
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let result = Args::try_parse_from([
            "fintrack",
            "add",
            "savings",
            "--date",
            "2024-01-15",
            "--amount",
            "1",
            "--category",
            "X",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_home_from_flag() {
        let args = Args::try_parse_from([
            "fintrack",
            "--fintrack-home",
            "/tmp/ft",
            "list",
            "expense",
        ])
        .unwrap();
        assert_eq!(args.common().fintrack_home().path(), Path::new("/tmp/ft"));
    }
}
