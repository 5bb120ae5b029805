//! Pure aggregation over record collections.
//!
//! Nothing here touches the filesystem: every function takes borrowed
//! records (or totals computed from them) and returns owned summaries. Dates
//! are stored as strings, so any function that needs calendar semantics
//! parses them and reports the first malformed date as a [`crate::Error`].

use crate::error::Result;
use crate::model::{Amount, Record};
use chrono::{Datelike, Local, NaiveDate};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A calendar month, year included. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month containing today's local date.
    pub fn current() -> Self {
        Self::of(Local::now().date_naive())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        *self == Self::of(date)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Totals per category name, preserving first-seen order.
pub type CategoryTotals = IndexMap<String, Decimal>;

/// The records with `start <= date <= end`, in input order. A range with
/// `start > end` matches nothing and is not an error.
pub fn filter_by_date_range<'a, I>(
    records: I,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<&'a Record>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut matches = Vec::new();
    for record in records {
        let date = record.parsed_date()?;
        if start <= date && date <= end {
            matches.push(record);
        }
    }
    Ok(matches)
}

/// Sums record amounts per category. Categories appear in first-seen order,
/// so the sum of the totals equals the sum of the input amounts.
pub fn sum_by_category<'a, I>(records: I) -> CategoryTotals
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut totals = CategoryTotals::new();
    for record in records {
        *totals
            .entry(record.category.clone())
            .or_insert(Decimal::ZERO) += record.amount.value();
    }
    totals
}

/// The categories with the highest and lowest totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Extrema {
    highest: (String, Decimal),
    lowest: (String, Decimal),
}

impl Extrema {
    pub fn highest(&self) -> (&str, Decimal) {
        (&self.highest.0, self.highest.1)
    }

    pub fn lowest(&self) -> (&str, Decimal) {
        (&self.lowest.0, self.lowest.1)
    }
}

/// Finds the highest- and lowest-total categories, or `None` for empty
/// totals. Ties go to the category seen first.
pub fn category_extrema(totals: &CategoryTotals) -> Option<Extrema> {
    let mut iter = totals.iter();
    let (first_name, first_total) = iter.next()?;
    let mut highest = (first_name.clone(), *first_total);
    let mut lowest = highest.clone();
    for (name, total) in iter {
        if *total > highest.1 {
            highest = (name.clone(), *total);
        }
        if *total < lowest.1 {
            lowest = (name.clone(), *total);
        }
    }
    Some(Extrema { highest, lowest })
}

/// Sums record amounts per calendar month, keyed chronologically.
pub fn sum_by_month<'a, I>(records: I) -> Result<BTreeMap<Month, Decimal>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut totals = BTreeMap::new();
    for record in records {
        let month = Month::of(record.parsed_date()?);
        *totals.entry(month).or_insert(Decimal::ZERO) += record.amount.value();
    }
    Ok(totals)
}

/// Income and spending totals side by side for a run of months.
///
/// The three vectors are parallel: `income[i]` and `spending[i]` belong to
/// `months[i]`. Months are sorted ascending, and a month present on only one
/// side carries an explicit zero on the other.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MonthlySeries {
    months: Vec<Month>,
    income: Vec<Decimal>,
    spending: Vec<Decimal>,
}

impl MonthlySeries {
    pub fn months(&self) -> &[Month] {
        &self.months
    }

    pub fn income(&self) -> &[Decimal] {
        &self.income
    }

    pub fn spending(&self) -> &[Decimal] {
        &self.spending
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

/// Compares monthly income totals against monthly spending totals over a
/// date range.
pub fn income_vs_spending<'a, I, E>(
    income: I,
    expenses: E,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<MonthlySeries>
where
    I: IntoIterator<Item = &'a Record>,
    E: IntoIterator<Item = &'a Record>,
{
    let income_totals = sum_by_month(filter_by_date_range(income, start, end)?)?;
    let spending_totals = sum_by_month(filter_by_date_range(expenses, start, end)?)?;

    // BTreeSet-style union through the ordered maps.
    let mut months: Vec<Month> = income_totals.keys().chain(spending_totals.keys()).copied().collect();
    months.sort();
    months.dedup();

    let income = months
        .iter()
        .map(|m| income_totals.get(m).copied().unwrap_or(Decimal::ZERO))
        .collect();
    let spending = months
        .iter()
        .map(|m| spending_totals.get(m).copied().unwrap_or(Decimal::ZERO))
        .collect();
    Ok(MonthlySeries {
        months,
        income,
        spending,
    })
}

/// Per-month, per-category totals for income and expenses together.
///
/// Amounts from both kinds accumulate in the same per-month map, so a
/// category name used by both kinds carries one combined total. The two
/// namespace lists record which names contributed from each side, sorted by
/// name, for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MonthlyByCategory {
    months: BTreeMap<Month, CategoryTotals>,
    income_categories: Vec<String>,
    expense_categories: Vec<String>,
}

impl MonthlyByCategory {
    pub fn months(&self) -> &BTreeMap<Month, CategoryTotals> {
        &self.months
    }

    pub fn income_categories(&self) -> &[String] {
        &self.income_categories
    }

    pub fn expense_categories(&self) -> &[String] {
        &self.expense_categories
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

/// Breaks down each month in the range into one combined category map over
/// income and expenses.
pub fn monthly_by_category<'a, I, E>(
    income: I,
    expenses: E,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<MonthlyByCategory>
where
    I: IntoIterator<Item = &'a Record>,
    E: IntoIterator<Item = &'a Record>,
{
    let mut months: BTreeMap<Month, CategoryTotals> = BTreeMap::new();
    let mut income_categories = Vec::new();
    let mut expense_categories = Vec::new();

    for record in filter_by_date_range(income, start, end)? {
        let month = Month::of(record.parsed_date()?);
        *months
            .entry(month)
            .or_default()
            .entry(record.category.clone())
            .or_insert(Decimal::ZERO) += record.amount.value();
        income_categories.push(record.category.clone());
    }
    for record in filter_by_date_range(expenses, start, end)? {
        let month = Month::of(record.parsed_date()?);
        *months
            .entry(month)
            .or_default()
            .entry(record.category.clone())
            .or_insert(Decimal::ZERO) += record.amount.value();
        expense_categories.push(record.category.clone());
    }

    income_categories.sort();
    income_categories.dedup();
    expense_categories.sort();
    expense_categories.dedup();
    Ok(MonthlyByCategory {
        months,
        income_categories,
        expense_categories,
    })
}

/// One category's budget position for a reference month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BudgetLine {
    category: String,
    spent: Decimal,
    limit: Decimal,
    remaining: Decimal,
}

impl BudgetLine {
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn spent(&self) -> Decimal {
        self.spent
    }

    pub fn limit(&self) -> Decimal {
        self.limit
    }

    /// Negative when the limit is exceeded.
    pub fn remaining(&self) -> Decimal {
        self.remaining
    }
}

/// Compares spending in the reference month against each configured limit.
///
/// Lines come out in limit configuration order. Only expenses dated inside
/// `month` count; a category with a limit but no spending reports the full
/// limit as remaining.
pub fn remaining_budget<'a, I>(
    expenses: I,
    limits: &IndexMap<String, Amount>,
    month: Month,
) -> Result<Vec<BudgetLine>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut in_month: Vec<&Record> = Vec::new();
    for record in expenses {
        if month.contains(record.parsed_date()?) {
            in_month.push(record);
        }
    }

    let mut lines = Vec::with_capacity(limits.len());
    for (category, limit) in limits {
        let spent: Decimal = in_month
            .iter()
            .filter(|r| r.category == *category)
            .map(|r| r.amount.value())
            .sum();
        let limit = limit.value();
        lines.push(BudgetLine {
            category: category.clone(),
            spent,
            limit,
            remaining: limit - spent,
        });
    }
    Ok(lines)
}
