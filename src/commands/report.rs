//! Handlers for the report and budget commands.

use crate::args::RangeArgs;
use crate::commands::{money, Out};
use crate::model::{parse_date, RecordKind};
use crate::report::{
    self, BudgetLine, CategoryTotals, Extrema, Month, MonthlyByCategory, MonthlySeries,
};
use crate::Store;
use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

/// Per-category totals and extrema for both kinds over one date range.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CategoryReport {
    income: CategoryTotals,
    spending: CategoryTotals,
    income_extrema: Option<Extrema>,
    spending_extrema: Option<Extrema>,
}

fn range(args: &RangeArgs) -> Result<(NaiveDate, NaiveDate)> {
    Ok((parse_date(args.start())?, parse_date(args.end())?))
}

fn extrema_lines(message: &mut Vec<String>, label: &str, extrema: &Option<Extrema>) {
    match extrema {
        Some(extrema) => {
            let (highest, highest_total) = extrema.highest();
            let (lowest, lowest_total) = extrema.lowest();
            message.push(format!(
                "Highest {label} category: {highest} with {}",
                money(highest_total)
            ));
            message.push(format!(
                "Lowest {label} category: {lowest} with {}",
                money(lowest_total)
            ));
        }
        None => message.push(format!("No {label} records in the range.")),
    }
}

/// Totals per category, calling out the highest and lowest categories for
/// spending and for income.
pub fn report_categories(store: &Store, args: &RangeArgs) -> Result<Out<CategoryReport>> {
    let (start, end) = range(args)?;
    let spending = report::sum_by_category(store.query_by_date_range(
        RecordKind::Expense,
        start,
        end,
    )?);
    let income = report::sum_by_category(store.query_by_date_range(
        RecordKind::Income,
        start,
        end,
    )?);
    let spending_extrema = report::category_extrema(&spending);
    let income_extrema = report::category_extrema(&income);

    let mut lines = Vec::new();
    extrema_lines(&mut lines, "spending", &spending_extrema);
    extrema_lines(&mut lines, "income", &income_extrema);
    Ok(Out::new(
        lines.join("\n"),
        CategoryReport {
            income,
            spending,
            income_extrema,
            spending_extrema,
        },
    ))
}

/// Income versus spending totals per month.
pub fn report_months(store: &Store, args: &RangeArgs) -> Result<Out<MonthlySeries>> {
    let (start, end) = range(args)?;
    let series = report::income_vs_spending(
        store.records(RecordKind::Income),
        store.records(RecordKind::Expense),
        start,
        end,
    )?;

    if series.is_empty() {
        return Ok(Out::new(
            format!("No records between {start} and {end}."),
            series,
        ));
    }
    let mut message = "Income vs. spending by month:".to_string();
    for (index, month) in series.months().iter().enumerate() {
        let income = series.income()[index];
        let spending = series.spending()[index];
        message.push_str(&format!(
            "\n{month}: income {}, spending {}, net {}",
            money(income),
            money(spending),
            money(income - spending)
        ));
    }
    Ok(Out::new(message, series))
}

/// A per-month breakdown of totals by category, income and expenses side by
/// side.
pub fn report_by_category(store: &Store, args: &RangeArgs) -> Result<Out<MonthlyByCategory>> {
    let (start, end) = range(args)?;
    let breakdown = report::monthly_by_category(
        store.records(RecordKind::Income),
        store.records(RecordKind::Expense),
        start,
        end,
    )?;

    if breakdown.is_empty() {
        return Ok(Out::new(
            format!("No records between {start} and {end}."),
            breakdown,
        ));
    }
    let mut message = "Monthly totals by category:".to_string();
    for (month, totals) in breakdown.months() {
        message.push_str(&format!("\n{month}"));
        for (category, total) in totals {
            message.push_str(&format!("\n  {category}: {}", money(*total)));
        }
    }
    Ok(Out::new(message, breakdown))
}

/// The remaining budget per spending limit for one reference month.
pub fn budget(store: &Store, month: Month) -> Result<Out<Vec<BudgetLine>>> {
    let lines = report::remaining_budget(
        store.records(RecordKind::Expense),
        store.registry().spending_limits(),
        month,
    )?;

    if lines.is_empty() {
        return Ok(Out::new("No spending limits set.".to_string(), lines));
    }
    let mut message = format!("Remaining budget for {month}:");
    for line in &lines {
        let position = if line.remaining().is_sign_negative() {
            format!("exceeded by {}", money(-line.remaining()))
        } else {
            format!("{} remaining", money(line.remaining()))
        };
        message.push_str(&format!(
            "\n{}: spent {} of {}, {position}",
            line.category(),
            money(line.spent()),
            money(line.limit())
        ));
    }
    Ok(Out::new(message, lines))
}
