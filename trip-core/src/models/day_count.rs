//! Day-count conventions for the per-day cost categories.
//!
//! A trip of `days` calendar days does not necessarily need `days` nights of
//! lodging or `days` lift tickets: the departure day has no night, and the
//! arrival and departure days are usually spent travelling. Each category
//! carries its own explicit policy. Food is always charged for every day.
//!
//! Counts saturate at zero, so a one-day trip yields zero nights and zero ski
//! days under the excluding policies rather than an error.

use serde::{Deserialize, Serialize};

/// How many nights of accommodation a trip needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NightsPolicy {
    /// One night per trip day (`days`).
    EveryDay,
    /// No lodging on the departure day (`days - 1`).
    #[default]
    ExcludeDepartureDay,
}

impl NightsPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EveryDay => "every-day",
            Self::ExcludeDepartureDay => "exclude-departure-day",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "every-day" => Some(Self::EveryDay),
            "exclude-departure-day" => Some(Self::ExcludeDepartureDay),
            _ => None,
        }
    }

    /// Number of nights for a trip of `days` days.
    pub fn count(&self, days: u32) -> u32 {
        match self {
            Self::EveryDay => days,
            Self::ExcludeDepartureDay => days.saturating_sub(1),
        }
    }
}

/// How many days of lift tickets a trip needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkiDaysPolicy {
    /// A lift ticket for every trip day (`days`).
    EveryDay,
    /// No skiing on the arrival and departure days (`days - 2`).
    #[default]
    ExcludeTravelDays,
}

impl SkiDaysPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EveryDay => "every-day",
            Self::ExcludeTravelDays => "exclude-travel-days",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "every-day" => Some(Self::EveryDay),
            "exclude-travel-days" => Some(Self::ExcludeTravelDays),
            _ => None,
        }
    }

    /// Number of ski days for a trip of `days` days.
    pub fn count(&self, days: u32) -> u32 {
        match self {
            Self::EveryDay => days,
            Self::ExcludeTravelDays => days.saturating_sub(2),
        }
    }
}

/// The combined day-count policy applied by the estimator.
///
/// The default excludes the departure night and both travel days from the
/// lift-ticket count. [`DayCountPolicy::every_day`] charges every category for
/// every trip day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DayCountPolicy {
    #[serde(default)]
    pub nights: NightsPolicy,
    #[serde(default)]
    pub ski_days: SkiDaysPolicy,
}

impl DayCountPolicy {
    pub fn new(
        nights: NightsPolicy,
        ski_days: SkiDaysPolicy,
    ) -> Self {
        Self { nights, ski_days }
    }

    /// Charges lodging and lift tickets for every trip day.
    pub fn every_day() -> Self {
        Self::new(NightsPolicy::EveryDay, SkiDaysPolicy::EveryDay)
    }

    pub fn nights(
        &self,
        days: u32,
    ) -> u32 {
        self.nights.count(days)
    }

    pub fn ski_days(
        &self,
        days: u32,
    ) -> u32 {
        self.ski_days.count(days)
    }
}
