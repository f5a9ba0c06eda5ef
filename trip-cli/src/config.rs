//! TOML configuration for the trip budget CLI.
//!
//! Every section and key is optional; anything left out falls back to the
//! built-in defaults returned by [`AppConfig::default`].
//!
//! Amounts may be TOML numbers or strings. TOML floats are binary, so a value
//! with more than 15 significant digits must be quoted
//! (`exchange_rate = "0.123456789012345678"`) to be read exactly.
//!
//! ```toml
//! [currency]
//! origin = "TWD"
//! destination = "JPY"
//! exchange_rate = 0.22
//! display_decimals = 0
//!
//! [day_count]
//! nights = "exclude-departure-day"
//! ski_days = "exclude-travel-days"
//!
//! [trip]
//! days = 5
//! people = 2
//! flight_cost = 20000
//! accommodation_per_night = 15000
//! lift_ticket_per_day = 8000
//! food_per_day = 5000
//!
//! [[lesson_presets]]
//! name = "camp"
//! description = "Training camp"
//! kind = "flat-package"
//! fee = 70000
//!
//! [[lesson_presets]]
//! name = "private"
//! kind = "split-private-instructor"
//! daily_rate = 90000
//! lesson_days = 2
//! ```

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use trip_core::{DayCountPolicy, LessonPlan};

/// Name that always selects [`LessonPlan::None`]; presets cannot use it.
pub const NO_LESSONS: &str = "none";

const MAX_DISPLAY_DECIMALS: u32 = 4;

/// Errors raised while loading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("currency.exchange_rate must be positive, got {0}")]
    InvalidExchangeRate(Decimal),

    #[error("currency.display_decimals must be at most {max}, got {0}", max = MAX_DISPLAY_DECIMALS)]
    InvalidDisplayDecimals(u32),

    #[error("lesson preset names must not be empty")]
    EmptyPresetName,

    #[error("lesson preset name '{name}' is reserved", name = NO_LESSONS)]
    ReservedPresetName,

    #[error("lesson preset '{0}' is defined more than once")]
    DuplicatePreset(String),
}

/// Currency labels and conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    /// Home currency of the traveller; flight cost and totals.
    pub origin: String,
    /// Currency of the daily costs at the resort.
    pub destination: String,
    /// Origin-currency units per destination-currency unit.
    pub exchange_rate: Decimal,
    /// Decimal places shown for amounts.
    pub display_decimals: u32,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            origin: "TWD".to_string(),
            destination: "JPY".to_string(),
            exchange_rate: Decimal::new(22, 2),
            display_decimals: 0,
        }
    }
}

/// Default trip parameters, overridable per command from the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripDefaults {
    pub days: u32,
    pub people: u32,
    pub flight_cost: Decimal,
    pub accommodation_per_night: Decimal,
    pub lift_ticket_per_day: Decimal,
    pub food_per_day: Decimal,
}

impl Default for TripDefaults {
    fn default() -> Self {
        Self {
            days: 5,
            people: 2,
            flight_cost: Decimal::from(20_000),
            accommodation_per_night: Decimal::from(15_000),
            lift_ticket_per_day: Decimal::from(8_000),
            food_per_day: Decimal::from(5_000),
        }
    }
}

/// A named lesson plan that can be selected with `--lesson-plan <name>`
/// and is listed by `compare`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonPreset {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub plan: LessonPlan,
}

impl LessonPreset {
    fn new(
        name: &str,
        description: &str,
        plan: LessonPlan,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: Some(description.to_string()),
            plan,
        }
    }
}

fn default_presets() -> Vec<LessonPreset> {
    vec![
        LessonPreset::new(
            "camp",
            "Training camp, group coaching over several days",
            LessonPlan::FlatPackage {
                fee: Decimal::from(70_000),
            },
        ),
        LessonPreset::new(
            "private",
            "Full-day private instructor shared by the party",
            LessonPlan::SplitPrivateInstructor {
                daily_rate: Decimal::from(90_000),
                lesson_days: 2,
            },
        ),
        LessonPreset::new(
            "casi",
            "Instructor certification course",
            LessonPlan::FlatPackage {
                fee: Decimal::from(25_000),
            },
        ),
    ]
}

/// Configuration passed explicitly to every command and renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub currency: CurrencyConfig,
    pub day_count: DayCountPolicy,
    pub trip: TripDefaults,
    pub lesson_presets: Vec<LessonPreset>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            currency: CurrencyConfig::default(),
            day_count: DayCountPolicy::default(),
            trip: TripDefaults::default(),
            lesson_presets: default_presets(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration at `path`, or the built-in defaults when no
    /// path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            debug!("no config file given, using built-in defaults");
            return Ok(Self::default());
        };

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        debug!(
            path = %path.display(),
            presets = config.lesson_presets.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the TOML schema cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.currency.exchange_rate <= Decimal::ZERO {
            return Err(ConfigError::InvalidExchangeRate(
                self.currency.exchange_rate,
            ));
        }
        if self.currency.display_decimals > MAX_DISPLAY_DECIMALS {
            return Err(ConfigError::InvalidDisplayDecimals(
                self.currency.display_decimals,
            ));
        }

        let mut seen = HashSet::new();
        for preset in &self.lesson_presets {
            let name = preset.name.trim();
            if name.is_empty() {
                return Err(ConfigError::EmptyPresetName);
            }
            if name == NO_LESSONS {
                return Err(ConfigError::ReservedPresetName);
            }
            if !seen.insert(name) {
                return Err(ConfigError::DuplicatePreset(name.to_string()));
            }
        }
        Ok(())
    }

    /// Looks up a lesson preset by name. `none` always resolves to
    /// [`LessonPlan::None`].
    pub fn lesson_plan(
        &self,
        name: &str,
    ) -> Option<LessonPlan> {
        if name == NO_LESSONS {
            return Some(LessonPlan::None);
        }
        self.lesson_presets
            .iter()
            .find(|preset| preset.name == name)
            .map(|preset| preset.plan)
    }

    /// Names accepted by `--lesson-plan`, `none` first.
    pub fn lesson_plan_names(&self) -> Vec<&str> {
        std::iter::once(NO_LESSONS)
            .chain(self.lesson_presets.iter().map(|p| p.name.as_str()))
            .collect()
    }
}
