//! Output formatting for `estimate`, `compare` and `batch`.
//!
//! Text output is a fixed-width table meant for a terminal. JSON output
//! carries the unrounded [`Decimal`] values as strings.

use std::fmt;

use clap::ValueEnum;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use trip_core::calculations::ratio;
use trip_core::{BudgetResult, DayCountPolicy, LessonPlan, TripBudgetInput};

use crate::app::{BatchRow, Estimate, Outcome, failed_rows};
use crate::config::CurrencyConfig;
use crate::utils::{format_amount, format_percent};

const BAR_WIDTH: u32 = 30;
const BAR: char = '█';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Serialize)]
struct EstimateJson<'a> {
    lesson_plan: &'a str,
    origin_currency: &'a str,
    destination_currency: &'a str,
    policy: &'a DayCountPolicy,
    input: &'a TripBudgetInput,
    result: &'a BudgetResult,
}

#[derive(Serialize)]
struct OutcomeJson<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    input: &'a TripBudgetInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a BudgetResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> From<&'a Outcome> for OutcomeJson<'a> {
    fn from(outcome: &'a Outcome) -> Self {
        Self {
            name: &outcome.name,
            description: outcome.description.as_deref(),
            input: &outcome.input,
            result: outcome.result.as_ref().ok(),
            error: outcome.result.as_ref().err().map(ToString::to_string),
        }
    }
}

#[derive(Serialize)]
struct BatchRowJson<'a> {
    row: usize,
    #[serde(flatten)]
    outcome: Option<OutcomeJson<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> From<&'a BatchRow> for BatchRowJson<'a> {
    fn from(batch_row: &'a BatchRow) -> Self {
        Self {
            row: batch_row.row,
            outcome: batch_row.entry.as_ref().ok().map(OutcomeJson::from),
            error: batch_row.entry.as_ref().err().map(ToString::to_string),
        }
    }
}

fn bar(share: Decimal) -> String {
    let width = (share * Decimal::from(BAR_WIDTH))
        .round()
        .to_usize()
        .unwrap_or(0);
    std::iter::repeat_n(BAR, width).collect()
}

fn lesson_summary(plan: &LessonPlan) -> String {
    match plan {
        LessonPlan::None => "no lessons".to_string(),
        LessonPlan::FlatPackage { fee } => format!("flat package of {}", format_amount(*fee, 0)),
        LessonPlan::SplitPrivateInstructor {
            daily_rate,
            lesson_days,
        } => format!(
            "private instructor at {} per day for {lesson_days} day(s), split",
            format_amount(*daily_rate, 0)
        ),
    }
}

fn width(text: &str) -> usize {
    text.chars().count()
}

/// Renders a single estimate.
pub fn estimate(
    estimate: &Estimate,
    currency: &CurrencyConfig,
    format: OutputFormat,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&EstimateJson {
            lesson_plan: &estimate.name,
            origin_currency: &currency.origin,
            destination_currency: &currency.destination,
            policy: &estimate.policy,
            input: &estimate.input,
            result: &estimate.result,
        }),
        OutputFormat::Text => Ok(EstimateText { estimate, currency }.to_string()),
    }
}

struct EstimateText<'a> {
    estimate: &'a Estimate,
    currency: &'a CurrencyConfig,
}

impl fmt::Display for EstimateText<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let currency = self.currency;
        let dp = currency.display_decimals;
        let input = &self.estimate.input;
        let result = &self.estimate.result;

        writeln!(
            f,
            "Lesson plan: {} ({})",
            self.estimate.name,
            lesson_summary(&input.lesson)
        )?;
        writeln!(
            f,
            "{} days, {} people: {} nights, {} ski days",
            input.days, input.people, result.nights, result.ski_days
        )?;
        writeln!(
            f,
            "1 {} = {} {}",
            currency.destination, input.exchange_rate, currency.origin
        )?;
        writeln!(
            f,
            "Spend at destination: {} {} per person",
            format_amount(result.destination_subtotal, dp),
            currency.destination
        )?;
        writeln!(f)?;

        let amounts: Vec<_> = result
            .breakdown
            .items()
            .iter()
            .map(|(category, amount)| (category.label(), format_amount(*amount, dp), *amount))
            .collect();
        let amount_width = amounts
            .iter()
            .map(|(_, text, _)| width(text))
            .chain([width(&format_amount(result.group_total, dp))])
            .max()
            .unwrap_or(0)
            .max(width(&currency.origin));
        let group_label = format!("Group of {}", input.people);
        let label_width = width(&group_label).max(width("Accommodation"));

        writeln!(
            f,
            "{:<label_width$}  {:>amount_width$}  {:>6}",
            "", currency.origin, "Share"
        )?;
        for (label, text, amount) in &amounts {
            let share = ratio(*amount, result.per_person_total).unwrap_or(Decimal::ZERO);
            writeln!(
                f,
                "{label:<label_width$}  {text:>amount_width$}  {:>6}  {}",
                format_percent(share),
                bar(share)
            )?;
        }
        writeln!(f, "{}", "-".repeat(label_width + amount_width + 10))?;
        writeln!(
            f,
            "{:<label_width$}  {:>amount_width$}",
            "Per person",
            format_amount(result.per_person_total, dp)
        )?;
        writeln!(
            f,
            "{group_label:<label_width$}  {:>amount_width$}",
            format_amount(result.group_total, dp)
        )?;
        writeln!(
            f,
            "{:<label_width$}  {:>amount_width$}",
            "Lesson share",
            format_percent(result.lesson_ratio)
        )
    }
}

/// First column left-aligned, the rest right-aligned. A row with fewer cells
/// than headers spills its last cell over the remaining columns.
struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push(
        &mut self,
        row: Vec<String>,
    ) {
        self.rows.push(row);
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| width(h)).collect();
        for row in &self.rows {
            if row.len() < widths.len() {
                if let (Some(first), Some(cell)) = (widths.first_mut(), row.first()) {
                    *first = (*first).max(width(cell));
                }
                continue;
            }
            for (column, cell) in widths.iter_mut().zip(row) {
                *column = (*column).max(width(cell));
            }
        }
        widths
    }

    fn write_row(
        f: &mut fmt::Formatter<'_>,
        widths: &[usize],
        cells: &[String],
    ) -> fmt::Result {
        let spills = cells.len() < widths.len();
        for (i, cell) in cells.iter().enumerate() {
            let column = widths.get(i).copied().unwrap_or(0);
            let last = i + 1 == cells.len();
            if i == 0 && last {
                write!(f, "{cell}")?;
            } else if i == 0 {
                write!(f, "{cell:<column$}")?;
            } else if spills && last {
                write!(f, "  {cell}")?;
            } else {
                write!(f, "  {cell:>column$}")?;
            }
        }
        writeln!(f)
    }
}

impl fmt::Display for Table {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let widths = self.column_widths();
        Self::write_row(f, &widths, &self.headers)?;
        let rule: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        writeln!(f, "{}", "-".repeat(rule))?;
        for row in &self.rows {
            Self::write_row(f, &widths, row)?;
        }
        Ok(())
    }
}

struct ComparisonText<'a> {
    table: Table,
    described: Vec<(&'a str, &'a str)>,
}

impl fmt::Display for ComparisonText<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.table)?;
        if !self.described.is_empty() {
            writeln!(f)?;
        }
        for (name, description) in &self.described {
            writeln!(f, "{name}: {description}")?;
        }
        Ok(())
    }
}

/// Renders `compare` rows. The first row is the no-lessons baseline; other
/// rows show their extra per-person cost against it.
pub fn comparison(
    outcomes: &[Outcome],
    currency: &CurrencyConfig,
    format: OutputFormat,
) -> serde_json::Result<String> {
    if format == OutputFormat::Json {
        let rows: Vec<OutcomeJson<'_>> = outcomes.iter().map(OutcomeJson::from).collect();
        return serde_json::to_string_pretty(&rows);
    }

    let dp = currency.display_decimals;
    let baseline = outcomes
        .first()
        .and_then(|o| o.result.as_ref().ok())
        .map(|r| r.per_person_total);

    let lesson_header = format!("Lessons ({})", currency.destination);
    let person_header = format!("Per person ({})", currency.origin);
    let group_header = format!("Group ({})", currency.origin);
    let mut table = Table::new(&[
        "Plan",
        lesson_header.as_str(),
        person_header.as_str(),
        group_header.as_str(),
        "Lesson share",
        "Extra",
    ]);

    for outcome in outcomes {
        match &outcome.result {
            Ok(result) => {
                let extra = baseline
                    .map(|base| format_amount(result.per_person_total - base, dp))
                    .unwrap_or_else(|| "-".to_string());
                table.push(vec![
                    outcome.name.clone(),
                    format_amount(result.lesson_cost, dp),
                    format_amount(result.per_person_total, dp),
                    format_amount(result.group_total, dp),
                    format_percent(result.lesson_ratio),
                    extra,
                ]);
            }
            Err(error) => table.push(vec![outcome.name.clone(), format!("error: {error}")]),
        }
    }

    let described = outcomes
        .iter()
        .filter_map(|o| o.description.as_deref().map(|d| (o.name.as_str(), d)))
        .collect();
    Ok(ComparisonText { table, described }.to_string())
}

struct BatchText {
    table: Table,
    total: usize,
    failed: usize,
}

impl fmt::Display for BatchText {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.table)?;
        writeln!(f)?;
        writeln!(f, "{} scenario(s), {} failed", self.total, self.failed)
    }
}

/// Renders `batch` rows with a footer counting failures. Rows the loader
/// rejected are listed by row number.
pub fn batch(
    rows: &[BatchRow],
    currency: &CurrencyConfig,
    format: OutputFormat,
) -> serde_json::Result<String> {
    if format == OutputFormat::Json {
        let rows: Vec<BatchRowJson<'_>> = rows.iter().map(BatchRowJson::from).collect();
        return serde_json::to_string_pretty(&rows);
    }

    let dp = currency.display_decimals;
    let person_header = format!("Per person ({})", currency.origin);
    let group_header = format!("Group ({})", currency.origin);
    let mut table = Table::new(&[
        "Scenario",
        "Days",
        "People",
        "Lessons",
        person_header.as_str(),
        group_header.as_str(),
        "Lesson share",
    ]);

    for batch_row in rows {
        let outcome = match &batch_row.entry {
            Ok(outcome) => outcome,
            Err(error) => {
                table.push(vec![
                    format!("row {}", batch_row.row),
                    format!("error: {error}"),
                ]);
                continue;
            }
        };
        match &outcome.result {
            Ok(result) => table.push(vec![
                outcome.name.clone(),
                outcome.input.days.to_string(),
                outcome.input.people.to_string(),
                outcome.input.lesson.as_str().to_string(),
                format_amount(result.per_person_total, dp),
                format_amount(result.group_total, dp),
                format_percent(result.lesson_ratio),
            ]),
            Err(error) => table.push(vec![outcome.name.clone(), format!("error: {error}")]),
        }
    }

    Ok(BatchText {
        table,
        total: rows.len(),
        failed: failed_rows(rows),
    }
    .to_string())
}
