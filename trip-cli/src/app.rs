//! Command handlers.
//!
//! Each handler takes the loaded [`AppConfig`] explicitly, builds estimator
//! inputs from configuration defaults and command-line overrides, and returns
//! plain data for [`crate::render`] to format.

use clap::Args;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};
use trip_core::{
    BudgetError, BudgetEstimator, BudgetResult, DayCountPolicy, LessonPlan, NightsPolicy,
    SkiDaysPolicy, TripBudgetInput,
};
use trip_data::{ScenarioLoadError, ScenarioRow};

use crate::config::{AppConfig, NO_LESSONS};
use crate::utils::{parse_decimal, parse_nights_policy, parse_ski_days_policy};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unknown lesson plan '{name}'; available: {available}")]
    UnknownLessonPlan { name: String, available: String },

    #[error(transparent)]
    Budget(#[from] BudgetError),
}

/// Day-count overrides. Unset flags fall back to `[day_count]`.
#[derive(Debug, Clone, Default, Args)]
pub struct PolicyArgs {
    /// Nights of lodging: `every-day` or `exclude-departure-day`.
    #[arg(long, value_parser = parse_nights_policy)]
    pub nights_policy: Option<NightsPolicy>,

    /// Lift-ticket days: `every-day` or `exclude-travel-days`.
    #[arg(long, value_parser = parse_ski_days_policy)]
    pub ski_days_policy: Option<SkiDaysPolicy>,
}

impl PolicyArgs {
    pub fn resolve(
        &self,
        config: &AppConfig,
    ) -> DayCountPolicy {
        DayCountPolicy::new(
            self.nights_policy.unwrap_or(config.day_count.nights),
            self.ski_days_policy.unwrap_or(config.day_count.ski_days),
        )
    }
}

/// Trip parameters. Unset flags fall back to `[trip]` and `[currency]`.
#[derive(Debug, Clone, Default, Args)]
pub struct TripArgs {
    /// Trip length in days, arrival and departure included.
    #[arg(long)]
    pub days: Option<u32>,

    /// Party size.
    #[arg(long)]
    pub people: Option<u32>,

    /// Return flight per person, origin currency.
    #[arg(long, value_parser = parse_decimal)]
    pub flight: Option<Decimal>,

    /// Lodging per person per night, destination currency.
    #[arg(long, value_parser = parse_decimal)]
    pub accommodation: Option<Decimal>,

    /// Lift ticket per person per day, destination currency.
    #[arg(long, value_parser = parse_decimal)]
    pub lift: Option<Decimal>,

    /// Food per person per day, destination currency.
    #[arg(long, value_parser = parse_decimal)]
    pub food: Option<Decimal>,

    /// Origin-currency units per destination-currency unit.
    #[arg(long, value_parser = parse_decimal)]
    pub exchange_rate: Option<Decimal>,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

impl TripArgs {
    /// Builds the estimator input for `lesson`, filling gaps from `config`.
    pub fn resolve(
        &self,
        config: &AppConfig,
        lesson: LessonPlan,
    ) -> TripBudgetInput {
        let defaults = &config.trip;
        TripBudgetInput {
            days: self.days.unwrap_or(defaults.days),
            people: self.people.unwrap_or(defaults.people),
            flight_cost: self.flight.unwrap_or(defaults.flight_cost),
            accommodation_per_night: self
                .accommodation
                .unwrap_or(defaults.accommodation_per_night),
            lift_ticket_per_day: self.lift.unwrap_or(defaults.lift_ticket_per_day),
            food_per_day: self.food.unwrap_or(defaults.food_per_day),
            lesson,
            exchange_rate: self.exchange_rate.unwrap_or(config.currency.exchange_rate),
        }
    }
}

/// Lesson selection for `estimate`: a named preset, or explicit parameters.
#[derive(Debug, Clone, Default, Args)]
pub struct LessonArgs {
    /// Lesson preset from the configuration, or `none`.
    #[arg(long, conflicts_with_all = ["lesson_fee", "instructor_rate"])]
    pub lesson_plan: Option<String>,

    /// Flat per-person lesson package, destination currency.
    #[arg(long, value_parser = parse_decimal, conflicts_with = "instructor_rate")]
    pub lesson_fee: Option<Decimal>,

    /// Private instructor daily rate, split across the party.
    #[arg(long, value_parser = parse_decimal, requires = "lesson_days")]
    pub instructor_rate: Option<Decimal>,

    /// Days with the private instructor.
    #[arg(long, requires = "instructor_rate")]
    pub lesson_days: Option<u32>,
}

impl LessonArgs {
    pub fn resolve(
        &self,
        config: &AppConfig,
    ) -> Result<(String, LessonPlan), AppError> {
        if let Some(name) = &self.lesson_plan {
            let plan = config
                .lesson_plan(name)
                .ok_or_else(|| AppError::UnknownLessonPlan {
                    name: name.clone(),
                    available: config.lesson_plan_names().join(", "),
                })?;
            return Ok((name.clone(), plan));
        }

        let plan = match (self.lesson_fee, self.instructor_rate, self.lesson_days) {
            (Some(fee), _, _) => LessonPlan::FlatPackage { fee },
            (None, Some(daily_rate), Some(lesson_days)) => LessonPlan::SplitPrivateInstructor {
                daily_rate,
                lesson_days,
            },
            _ => LessonPlan::None,
        };
        let name = match plan {
            LessonPlan::None => NO_LESSONS.to_string(),
            other => other.as_str().to_string(),
        };
        Ok((name, plan))
    }
}

/// One successful estimate together with what produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Estimate {
    pub name: String,
    pub input: TripBudgetInput,
    pub policy: DayCountPolicy,
    pub result: BudgetResult,
}

/// One row of a `compare` or `batch` run. Rows fail independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub name: String,
    pub description: Option<String>,
    pub input: TripBudgetInput,
    pub result: Result<BudgetResult, BudgetError>,
}

impl Outcome {
    fn evaluate(
        estimator: &BudgetEstimator,
        name: String,
        description: Option<String>,
        input: TripBudgetInput,
    ) -> Self {
        let result = estimator.estimate(&input);
        if let Err(error) = &result {
            warn!(scenario = %name, %error, "estimate rejected");
        }
        Self {
            name,
            description,
            input,
            result,
        }
    }
}

/// `estimate`: one trip, all-or-nothing.
pub fn estimate_trip(
    config: &AppConfig,
    trip: &TripArgs,
    lesson: &LessonArgs,
) -> Result<Estimate, AppError> {
    let (name, plan) = lesson.resolve(config)?;
    let input = trip.resolve(config, plan);
    let policy = trip.policy.resolve(config);

    let result = BudgetEstimator::new(policy).estimate(&input)?;
    info!(lesson_plan = %name, per_person_total = %result.per_person_total, "estimate complete");

    Ok(Estimate {
        name,
        input,
        policy,
        result,
    })
}

/// `compare`: the same trip with no lessons and with every configured preset.
pub fn compare_lesson_plans(
    config: &AppConfig,
    trip: &TripArgs,
) -> Vec<Outcome> {
    let estimator = BudgetEstimator::new(trip.policy.resolve(config));

    let baseline = Outcome::evaluate(
        &estimator,
        NO_LESSONS.to_string(),
        Some("No lessons".to_string()),
        trip.resolve(config, LessonPlan::None),
    );

    std::iter::once(baseline)
        .chain(config.lesson_presets.iter().map(|preset| {
            Outcome::evaluate(
                &estimator,
                preset.name.clone(),
                preset.description.clone(),
                trip.resolve(config, preset.plan),
            )
        }))
        .collect()
}

pub fn failed_count(outcomes: &[Outcome]) -> usize {
    outcomes.iter().filter(|o| o.result.is_err()).count()
}

/// One CSV row of a `batch` run: estimated, or rejected by the loader.
#[derive(Debug)]
pub struct BatchRow {
    /// 1-based data row number.
    pub row: usize,
    pub entry: Result<Outcome, ScenarioLoadError>,
}

impl BatchRow {
    pub fn is_failure(&self) -> bool {
        match &self.entry {
            Ok(outcome) => outcome.result.is_err(),
            Err(_) => true,
        }
    }
}

/// `batch`: every row of a CSV file. Rows that fail to load or to estimate
/// are kept in place as failures.
pub fn estimate_scenarios(
    rows: Vec<ScenarioRow>,
    policy: DayCountPolicy,
) -> Vec<BatchRow> {
    let estimator = BudgetEstimator::new(policy);
    let batch: Vec<_> = rows
        .into_iter()
        .map(|ScenarioRow { row, scenario }| {
            let entry = scenario
                .map(|s| Outcome::evaluate(&estimator, s.name, None, s.input))
                .inspect_err(|error| warn!(row, %error, "row rejected"));
            BatchRow { row, entry }
        })
        .collect();

    let failed = failed_rows(&batch);
    info!(total = batch.len(), failed, "batch complete");
    batch
}

pub fn failed_rows(rows: &[BatchRow]) -> usize {
    rows.iter().filter(|r| r.is_failure()).count()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn two_week_trip() -> TripArgs {
        TripArgs {
            days: Some(14),
            flight: Some(dec!(22000)),
            lift: Some(dec!(9000)),
            food: Some(dec!(7000)),
            ..TripArgs::default()
        }
    }

    #[test]
    fn trip_args_fall_back_to_config() {
        let config = AppConfig::default();

        let input = TripArgs::default().resolve(&config, LessonPlan::None);

        assert_eq!(
            input,
            TripBudgetInput {
                days: 5,
                people: 2,
                flight_cost: dec!(20000),
                accommodation_per_night: dec!(15000),
                lift_ticket_per_day: dec!(8000),
                food_per_day: dec!(5000),
                lesson: LessonPlan::None,
                exchange_rate: dec!(0.22),
            }
        );
    }

    #[test]
    fn trip_args_override_config() {
        let config = AppConfig::default();

        let input = two_week_trip().resolve(&config, LessonPlan::None);

        assert_eq!(input.days, 14);
        assert_eq!(input.flight_cost, dec!(22000));
        assert_eq!(input.accommodation_per_night, dec!(15000));
    }

    #[test]
    fn policy_args_override_config() {
        let config = AppConfig::default();
        let args = PolicyArgs {
            nights_policy: Some(NightsPolicy::EveryDay),
            ski_days_policy: None,
        };

        assert_eq!(
            args.resolve(&config),
            DayCountPolicy::new(NightsPolicy::EveryDay, SkiDaysPolicy::ExcludeTravelDays)
        );
    }

    #[test]
    fn lesson_args_select_preset() {
        let config = AppConfig::default();
        let args = LessonArgs {
            lesson_plan: Some("camp".to_string()),
            ..LessonArgs::default()
        };

        let (name, plan) = args.resolve(&config).unwrap();

        assert_eq!(name, "camp");
        assert_eq!(plan, LessonPlan::FlatPackage { fee: dec!(70000) });
    }

    #[test]
    fn lesson_args_unknown_preset_lists_available() {
        let config = AppConfig::default();
        let args = LessonArgs {
            lesson_plan: Some("heli".to_string()),
            ..LessonArgs::default()
        };

        match args.resolve(&config) {
            Err(AppError::UnknownLessonPlan { name, available }) => {
                assert_eq!(name, "heli");
                assert_eq!(available, "none, camp, private, casi");
            }
            other => panic!("expected UnknownLessonPlan, got {other:?}"),
        }
    }

    #[test]
    fn lesson_args_explicit_parameters() {
        let config = AppConfig::default();

        let flat = LessonArgs {
            lesson_fee: Some(dec!(150000)),
            ..LessonArgs::default()
        };
        let split = LessonArgs {
            instructor_rate: Some(dec!(90000)),
            lesson_days: Some(3),
            ..LessonArgs::default()
        };

        assert_eq!(
            flat.resolve(&config).unwrap(),
            (
                "flat-package".to_string(),
                LessonPlan::FlatPackage { fee: dec!(150000) }
            )
        );
        assert_eq!(
            split.resolve(&config).unwrap().1,
            LessonPlan::SplitPrivateInstructor {
                daily_rate: dec!(90000),
                lesson_days: 3,
            }
        );
        assert_eq!(
            LessonArgs::default().resolve(&config).unwrap(),
            ("none".to_string(), LessonPlan::None)
        );
    }

    #[test]
    fn estimate_trip_matches_worked_example() {
        let config = AppConfig::default();
        let lesson = LessonArgs {
            lesson_fee: Some(dec!(150000)),
            ..LessonArgs::default()
        };

        let estimate = estimate_trip(&config, &two_week_trip(), &lesson).unwrap();

        assert_eq!(estimate.result.per_person_total, dec!(143220));
        assert_eq!(estimate.result.group_total, dec!(286440));
        assert_eq!(estimate.policy, DayCountPolicy::default());
    }

    #[test]
    fn estimate_trip_rejects_invalid_input() {
        let config = AppConfig::default();
        let trip = TripArgs {
            people: Some(0),
            ..TripArgs::default()
        };

        let result = estimate_trip(&config, &trip, &LessonArgs::default());

        assert!(matches!(
            result,
            Err(AppError::Budget(BudgetError::InvalidPeople(0)))
        ));
    }

    #[test]
    fn compare_lists_baseline_then_presets() {
        let config = AppConfig::default();

        let rows = compare_lesson_plans(&config, &TripArgs::default());

        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["none", "camp", "private", "casi"]);
        assert_eq!(failed_count(&rows), 0);
    }

    #[test]
    fn compare_uses_same_trip_for_every_plan() {
        let config = AppConfig::default();

        let rows = compare_lesson_plans(&config, &TripArgs::default());

        // 5 days, default policy: 15000×4 + 8000×3 + 5000×5 = 109000
        let baseline = rows[0].result.as_ref().unwrap();
        assert_eq!(baseline.destination_subtotal, dec!(109000));
        // camp adds 70000 × 0.22 per person
        let camp = rows[1].result.as_ref().unwrap();
        assert_eq!(
            camp.per_person_total - baseline.per_person_total,
            dec!(15400)
        );
        // private: 90000 × 2 ÷ 2 people
        let private = rows[2].result.as_ref().unwrap();
        assert_eq!(private.lesson_cost, dec!(90000));
    }

    #[test]
    fn compare_row_fails_alone_when_preset_does_not_fit_trip() {
        let config = AppConfig::default();
        let trip = TripArgs {
            days: Some(1),
            ..TripArgs::default()
        };

        let rows = compare_lesson_plans(&config, &trip);

        assert_eq!(failed_count(&rows), 1);
        assert_eq!(
            rows[2].result,
            Err(BudgetError::LessonDaysExceedTrip {
                lesson_days: 2,
                days: 1,
            })
        );
        assert!(rows[0].result.is_ok());
        assert!(rows[1].result.is_ok());
    }

    fn scenario_row(
        row: usize,
        name: &str,
        input: TripBudgetInput,
    ) -> ScenarioRow {
        ScenarioRow {
            row,
            scenario: Ok(trip_data::Scenario {
                name: name.to_string(),
                input,
            }),
        }
    }

    #[test]
    fn estimate_scenarios_keeps_going_after_failures() {
        let good = TripArgs::default().resolve(&AppConfig::default(), LessonPlan::None);
        let bad = TripBudgetInput {
            exchange_rate: dec!(0),
            ..good.clone()
        };
        let rows = vec![scenario_row(1, "bad", bad), scenario_row(2, "good", good)];

        let batch = estimate_scenarios(rows, DayCountPolicy::default());

        assert_eq!(batch.len(), 2);
        assert_eq!(failed_rows(&batch), 1);
        assert_eq!(
            batch[0].entry.as_ref().unwrap().result,
            Err(BudgetError::InvalidExchangeRate(dec!(0)))
        );
        assert!(batch[1].entry.as_ref().unwrap().result.is_ok());
    }

    #[test]
    fn estimate_scenarios_keeps_rows_rejected_by_loader() {
        let csv = "\
name,days,people,flight_cost,accommodation_per_night,lift_ticket_per_day,food_per_day,exchange_rate,lesson_plan,lesson_fee
good,5,2,20000,15000,8000,5000,0.22,none,
typo,5,2,20000,15000,8000,5000,0.22,flat-pakage,70000
";
        let rows = trip_data::ScenarioLoader::parse_rows(csv.as_bytes());

        let batch = estimate_scenarios(rows, DayCountPolicy::default());

        assert_eq!(batch.len(), 2);
        assert_eq!(failed_rows(&batch), 1);
        let good = batch[0].entry.as_ref().unwrap();
        assert_eq!(good.name, "good");
        // 20000 + (15000×4 + 8000×3 + 5000×5) × 0.22
        assert_eq!(
            good.result.as_ref().map(|r| r.per_person_total),
            Ok(dec!(43980))
        );
        assert_eq!(batch[1].row, 2);
        assert!(matches!(
            batch[1].entry,
            Err(ScenarioLoadError::UnknownLessonPlan { row: 2, .. })
        ));
    }
}
