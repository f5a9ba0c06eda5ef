use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use trip_cli::app::{self, LessonArgs, PolicyArgs, TripArgs};
use trip_cli::config::AppConfig;
use trip_cli::logging::{self, LogOptions};
use trip_cli::render::{self, OutputFormat};
use trip_data::ScenarioLoader;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Ski trip budget estimator.
///
/// Converts resort costs to the home currency and reports a per-person
/// breakdown, the group total, and the share spent on lessons.
#[derive(Debug, Parser)]
#[command(name = "trip-budget")]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level or EnvFilter directive. `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Also append log records to this file. A directory gets
    /// `trip-budget.log` inside it.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Report format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Estimate one trip.
    Estimate {
        #[command(flatten)]
        trip: TripArgs,

        #[command(flatten)]
        lesson: LessonArgs,
    },

    /// Estimate one trip under every configured lesson preset.
    Compare {
        #[command(flatten)]
        trip: TripArgs,
    },

    /// Estimate every scenario in a CSV file.
    Batch {
        /// Path to the scenario CSV file.
        #[arg(short, long)]
        file: PathBuf,

        #[command(flatten)]
        policy: PolicyArgs,
    },
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(&LogOptions {
        level: cli.log_level.clone(),
        file: cli.log_file.clone(),
    })?;

    let config = AppConfig::load(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load config: {}", path.display()),
        None => "Failed to load built-in config".to_string(),
    })?;
    debug!(currency = ?config.currency, day_count = ?config.day_count, "configuration ready");

    run(&cli, &config)
}

fn run(
    cli: &Cli,
    config: &AppConfig,
) -> Result<()> {
    match &cli.command {
        Command::Estimate { trip, lesson } => {
            let estimate =
                app::estimate_trip(config, trip, lesson).context("Failed to estimate trip")?;
            print!(
                "{}",
                render::estimate(&estimate, &config.currency, cli.format)?
            );
        }

        Command::Compare { trip } => {
            let outcomes = app::compare_lesson_plans(config, trip);
            print!(
                "{}",
                render::comparison(&outcomes, &config.currency, cli.format)?
            );
        }

        Command::Batch { file, policy } => {
            let scenarios = ScenarioLoader::load_rows(file)
                .with_context(|| format!("Failed to load scenarios: {}", file.display()))?;
            debug!(count = scenarios.len(), "read scenario rows");

            let rows = app::estimate_scenarios(scenarios, policy.resolve(config));
            print!("{}", render::batch(&rows, &config.currency, cli.format)?);

            let failed = app::failed_rows(&rows);
            if failed > 0 {
                anyhow::bail!("{failed} of {} scenario(s) failed", rows.len());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use trip_core::NightsPolicy;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn estimate_parses_amounts_with_separators() {
        let cli = Cli::try_parse_from([
            "trip-budget",
            "estimate",
            "--days",
            "14",
            "--flight",
            "22,000",
            "--lesson-fee",
            "150,000",
        ])
        .unwrap();

        match cli.command {
            Command::Estimate { trip, lesson } => {
                assert_eq!(trip.days, Some(14));
                assert_eq!(trip.flight, Some(dec!(22000)));
                assert_eq!(lesson.lesson_fee, Some(dec!(150000)));
                assert_eq!(trip.people, None);
            }
            other => panic!("expected estimate, got {other:?}"),
        }
    }

    #[test]
    fn exchange_rate_accepts_separators_and_long_fractions() {
        let cli = Cli::try_parse_from([
            "trip-budget",
            "compare",
            "--exchange-rate",
            "1,234.567890123456789",
        ])
        .unwrap();

        match cli.command {
            Command::Compare { trip } => {
                assert_eq!(trip.exchange_rate, Some(dec!(1234.567890123456789)));
            }
            other => panic!("expected compare, got {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "trip-budget",
            "compare",
            "--format",
            "json",
            "--nights-policy",
            "every-day",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.log_level, "warn");
        match cli.command {
            Command::Compare { trip } => {
                assert_eq!(trip.policy.nights_policy, Some(NightsPolicy::EveryDay));
            }
            other => panic!("expected compare, got {other:?}"),
        }
    }

    #[test]
    fn instructor_rate_requires_lesson_days() {
        let result = Cli::try_parse_from([
            "trip-budget",
            "estimate",
            "--instructor-rate",
            "90000",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn preset_conflicts_with_explicit_lesson() {
        let result = Cli::try_parse_from([
            "trip-budget",
            "estimate",
            "--lesson-plan",
            "camp",
            "--lesson-fee",
            "1000",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn bad_policy_and_amount_are_rejected() {
        assert!(Cli::try_parse_from(["trip-budget", "compare", "--nights-policy", "never"]).is_err());
        assert!(Cli::try_parse_from(["trip-budget", "estimate", "--food", "lots"]).is_err());
    }

    #[test]
    fn batch_requires_file() {
        assert!(Cli::try_parse_from(["trip-budget", "batch"]).is_err());

        let cli = Cli::try_parse_from(["trip-budget", "batch", "-f", "trips.csv"]).unwrap();
        match cli.command {
            Command::Batch { file, .. } => assert_eq!(file, PathBuf::from("trips.csv")),
            other => panic!("expected batch, got {other:?}"),
        }
    }

    #[test]
    fn run_batch_fails_when_any_row_fails() {
        let dir = std::env::temp_dir().join(format!("trip-budget-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("batch.csv");
        std::fs::write(
            &file,
            "name,days,people,flight_cost,accommodation_per_night,lift_ticket_per_day,food_per_day,exchange_rate\n\
             ok,5,2,20000,15000,8000,5000,0.22\n\
             broken,0,2,20000,15000,8000,5000,0.22\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from(["trip-budget", "batch", "--file", file.to_str().unwrap()])
            .unwrap();
        let err = run(&cli, &AppConfig::default()).unwrap_err();

        assert_eq!(err.to_string(), "1 of 2 scenario(s) failed");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn run_batch_counts_rows_the_loader_rejects() {
        let dir = std::env::temp_dir().join(format!("trip-budget-typo-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("batch.csv");
        std::fs::write(
            &file,
            "name,days,people,flight_cost,accommodation_per_night,lift_ticket_per_day,food_per_day,exchange_rate,lesson_plan,lesson_fee\n\
             ok,5,2,20000,15000,8000,5000,0.22,,\n\
             typo,5,2,20000,15000,8000,5000,0.22,flat-pakage,150000\n\
             also ok,5,2,20000,15000,8000,5000,0.22,flat-package,150000\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from(["trip-budget", "batch", "--file", file.to_str().unwrap()])
            .unwrap();
        let err = run(&cli, &AppConfig::default()).unwrap_err();

        assert_eq!(err.to_string(), "1 of 3 scenario(s) failed");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
