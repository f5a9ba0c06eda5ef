//! CSV loader for trip scenarios.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does not matter. Header names
//! are case-sensitive. Whitespace around values is trimmed.
//!
//! | Column                    | Required                    | Type    |
//! |---------------------------|-----------------------------|---------|
//! | `name`                    | yes                         | string  |
//! | `days`                    | yes                         | integer |
//! | `people`                  | yes                         | integer |
//! | `flight_cost`             | yes                         | decimal |
//! | `accommodation_per_night` | yes                         | decimal |
//! | `lift_ticket_per_day`     | yes                         | decimal |
//! | `food_per_day`            | yes                         | decimal |
//! | `exchange_rate`           | yes                         | decimal |
//! | `lesson_plan`             | no                          | string  |
//! | `lesson_fee`              | for `flat-package`          | decimal |
//! | `instructor_daily_rate`   | for `split-private-instructor` | decimal |
//! | `lesson_days`             | for `split-private-instructor` | integer |
//!
//! `lesson_plan` is one of `none`, `flat-package` or
//! `split-private-instructor`. An empty cell or a missing column means `none`.
//!
//! ### Example
//!
//! ```csv
//! name,days,people,flight_cost,accommodation_per_night,lift_ticket_per_day,food_per_day,exchange_rate,lesson_plan,lesson_fee,instructor_daily_rate,lesson_days
//! Rusutsu camp,14,2,22000,15000,9000,7000,0.22,flat-package,150000,,
//! Niseko private,5,2,20000,20000,8000,5000,0.22,split-private-instructor,,90000,2
//! ```
//!
//! Amounts are parsed from the cell text, so every digit written in the file
//! is kept.
//!
//! The loader only checks shape. Value constraints (positive exchange rate,
//! lesson days within the trip, ...) are enforced by the estimator.

use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use trip_core::{LessonPlan, TripBudgetInput};

/// Errors that can occur when loading scenarios.
#[derive(Debug, Error)]
pub enum ScenarioLoadError {
    /// The file could not be read.
    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The CSV is structurally invalid or a cell has the wrong type.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// `lesson_plan` is not a recognised plan name. `row` is 1-based.
    #[error("unrecognised lesson plan '{plan}' on row {row}")]
    UnknownLessonPlan { plan: String, row: usize },

    /// The chosen lesson plan needs a column that is empty or absent.
    #[error("lesson plan '{plan}' on row {row} requires '{column}'")]
    MissingLessonField {
        plan: &'static str,
        column: &'static str,
        row: usize,
    },
}

/// A named trip read from one CSV row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub input: TripBudgetInput,
}

/// One data row and what it parsed to. `row` is 1-based.
#[derive(Debug)]
pub struct ScenarioRow {
    pub row: usize,
    pub scenario: Result<Scenario, ScenarioLoadError>,
}

fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.trim().parse::<Decimal>().map_err(serde::de::Error::custom)
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

// Mirrors the CSV layout exactly
#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    days: u32,
    people: u32,
    #[serde(deserialize_with = "deserialize_decimal")]
    flight_cost: Decimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    accommodation_per_night: Decimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    lift_ticket_per_day: Decimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    food_per_day: Decimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    exchange_rate: Decimal,
    lesson_plan: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    lesson_fee: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    instructor_daily_rate: Option<Decimal>,
    lesson_days: Option<u32>,
}

fn require<T>(
    value: Option<T>,
    plan: &'static str,
    column: &'static str,
    row: usize,
) -> Result<T, ScenarioLoadError> {
    value.ok_or(ScenarioLoadError::MissingLessonField { plan, column, row })
}

fn lesson_plan_from_row(
    row: &CsvRow,
    row_number: usize,
) -> Result<LessonPlan, ScenarioLoadError> {
    match row.lesson_plan.as_deref().unwrap_or("") {
        "" | "none" => Ok(LessonPlan::None),
        "flat-package" => Ok(LessonPlan::FlatPackage {
            fee: require(row.lesson_fee, "flat-package", "lesson_fee", row_number)?,
        }),
        "split-private-instructor" => Ok(LessonPlan::SplitPrivateInstructor {
            daily_rate: require(
                row.instructor_daily_rate,
                "split-private-instructor",
                "instructor_daily_rate",
                row_number,
            )?,
            lesson_days: require(
                row.lesson_days,
                "split-private-instructor",
                "lesson_days",
                row_number,
            )?,
        }),
        other => Err(ScenarioLoadError::UnknownLessonPlan {
            plan: other.to_string(),
            row: row_number,
        }),
    }
}

fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<Scenario, ScenarioLoadError> {
    let lesson = lesson_plan_from_row(&row, row_number)?;

    Ok(Scenario {
        name: row.name,
        input: TripBudgetInput {
            days: row.days,
            people: row.people,
            flight_cost: row.flight_cost,
            accommodation_per_night: row.accommodation_per_night,
            lift_ticket_per_day: row.lift_ticket_per_day,
            food_per_day: row.food_per_day,
            lesson,
            exchange_rate: row.exchange_rate,
        },
    })
}

fn read_file(path: &Path) -> Result<String, ScenarioLoadError> {
    std::fs::read_to_string(path).map_err(|source| ScenarioLoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Loader for trip scenarios from CSV data.
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// Parse scenarios from any reader. Rows are returned in file order.
    ///
    /// # Errors
    ///
    /// * [`ScenarioLoadError::Parse`] if the CSV is malformed or a required
    ///   column is missing or mistyped.
    /// * [`ScenarioLoadError::UnknownLessonPlan`] or
    ///   [`ScenarioLoadError::MissingLessonField`] for bad lesson columns.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<Scenario>, ScenarioLoadError> {
        let scenarios = Self::parse_rows(reader)
            .into_iter()
            .map(|row| row.scenario)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = scenarios.len(), "parsed trip scenarios");
        Ok(scenarios)
    }

    /// Parse every data row independently. A bad row yields an error in its
    /// own [`ScenarioRow`] and the following rows are still read.
    pub fn parse_rows<R: Read>(reader: R) -> Vec<ScenarioRow> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(false)
            .from_reader(reader);

        let rows: Vec<_> = csv_reader
            .deserialize::<CsvRow>()
            .enumerate()
            .map(|(idx, result)| {
                let row = idx + 1;
                let scenario = result
                    .map_err(ScenarioLoadError::from)
                    .and_then(|record| convert_row(record, row));
                ScenarioRow { row, scenario }
            })
            .collect();

        let failed = rows.iter().filter(|r| r.scenario.is_err()).count();
        debug!(count = rows.len(), failed, "parsed scenario rows");
        rows
    }

    /// Parse scenarios from CSV text.
    pub fn parse_str(input: &str) -> Result<Vec<Scenario>, ScenarioLoadError> {
        Self::parse(input.as_bytes())
    }

    /// Read a file from disk and delegate to [`ScenarioLoader::parse_str`].
    pub fn load_file(path: &Path) -> Result<Vec<Scenario>, ScenarioLoadError> {
        Self::parse_str(&read_file(path)?)
    }

    /// Read a file from disk and delegate to [`ScenarioLoader::parse_rows`].
    /// Only an unreadable file fails as a whole.
    pub fn load_rows(path: &Path) -> Result<Vec<ScenarioRow>, ScenarioLoadError> {
        Ok(Self::parse_rows(read_file(path)?.as_bytes()))
    }
}
