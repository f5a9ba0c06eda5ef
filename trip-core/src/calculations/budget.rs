//! Ski trip budget estimate.
//!
//! Daily costs are summed in destination currency, converted once with the
//! trip's exchange rate, and added to the flight cost, which is already in
//! origin currency.
//!
//! # Computation
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Validate the input (nothing is computed on invalid input) |
//! | 2    | Nights and ski days from the [`DayCountPolicy`] |
//! | 3    | Per-person lesson cost from the [`LessonPlan`](crate::LessonPlan) |
//! | 4    | Destination subtotal: lodging × nights + lift × ski days + food × days + lessons |
//! | 5    | Convert each destination category with the exchange rate |
//! | 6    | Per-person total: flight + converted categories |
//! | 7    | Group total: per-person total × people |
//! | 8    | Lesson ratio: converted lessons ÷ per-person total |
//!
//! No step rounds. Amounts stay exact so the breakdown always sums to the
//! per-person total and the group total is an exact multiple of it.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use trip_core::{BudgetEstimator, DayCountPolicy, LessonPlan, TripBudgetInput};
//!
//! let input = TripBudgetInput {
//!     days: 14,
//!     people: 2,
//!     flight_cost: dec!(22000),
//!     accommodation_per_night: dec!(15000),
//!     lift_ticket_per_day: dec!(9000),
//!     food_per_day: dec!(7000),
//!     lesson: LessonPlan::FlatPackage { fee: dec!(150000) },
//!     exchange_rate: dec!(0.22),
//! };
//!
//! let estimator = BudgetEstimator::new(DayCountPolicy::default());
//! let result = estimator.estimate(&input).unwrap();
//!
//! assert_eq!(result.destination_subtotal, dec!(551000));
//! assert_eq!(result.per_person_total, dec!(143220));
//! assert_eq!(result.group_total, dec!(286440));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::ratio;
use crate::{BudgetResult, CostBreakdown, DayCountPolicy, TripBudgetInput};

/// Errors that can occur while estimating a trip budget.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BudgetError {
    /// The trip must last at least one day.
    #[error("trip must last at least one day, got {0}")]
    InvalidDays(u32),

    /// The party must include at least one person.
    #[error("party must include at least one person, got {0}")]
    InvalidPeople(u32),

    /// The exchange rate must be strictly positive.
    #[error("exchange rate must be positive, got {0}")]
    InvalidExchangeRate(Decimal),

    /// A monetary input was negative.
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },

    /// A split private instructor was booked for more days than the trip.
    #[error("instructor booked for {lesson_days} days but the trip lasts {days}")]
    LessonDaysExceedTrip { lesson_days: u32, days: u32 },

    /// Every cost is zero, so the lesson ratio has no denominator.
    #[error("per-person total is zero, lesson ratio is undefined")]
    ZeroTotal,

    /// An intermediate amount does not fit in a [`Decimal`].
    #[error("{0} exceeds the representable range")]
    Overflow(&'static str),
}

/// Calculator for trip budgets under a fixed day-count policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetEstimator {
    policy: DayCountPolicy,
}

impl BudgetEstimator {
    pub fn new(policy: DayCountPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DayCountPolicy {
        self.policy
    }

    /// Estimates the budget for one trip.
    ///
    /// Pure and deterministic: the same input always yields the same result.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetError`] if the input fails
    /// [`TripBudgetInput::validate`], if every cost is zero (the lesson ratio
    /// would divide by zero), or if an amount overflows.
    pub fn estimate(
        &self,
        input: &TripBudgetInput,
    ) -> Result<BudgetResult, BudgetError> {
        input.validate()?;

        let nights = self.policy.nights(input.days);
        let ski_days = self.policy.ski_days(input.days);

        let lesson_cost = input.lesson.per_person_cost(input.people)?;

        let accommodation = self.daily_cost(
            input.accommodation_per_night,
            nights,
            "accommodation",
        )?;
        let lift_tickets = self.daily_cost(input.lift_ticket_per_day, ski_days, "lift tickets")?;
        let food = self.daily_cost(input.food_per_day, input.days, "food")?;

        let destination_subtotal =
            self.destination_subtotal(&[accommodation, lift_tickets, food, lesson_cost])?;

        let rate = input.exchange_rate;
        let breakdown = CostBreakdown {
            flight: input.flight_cost,
            accommodation: self.convert(accommodation, rate, "accommodation")?,
            lift_tickets: self.convert(lift_tickets, rate, "lift tickets")?,
            food: self.convert(food, rate, "food")?,
            lessons: self.convert(lesson_cost, rate, "lessons")?,
        };

        let per_person_total = breakdown.total()?;

        let group_total = self.group_total(per_person_total, input.people)?;

        let lesson_ratio =
            ratio(breakdown.lessons, per_person_total).ok_or(BudgetError::ZeroTotal)?;

        debug!(
            days = input.days,
            people = input.people,
            nights,
            ski_days,
            lesson_plan = input.lesson.as_str(),
            %per_person_total,
            %group_total,
            "estimated trip budget"
        );

        Ok(BudgetResult {
            nights,
            ski_days,
            lesson_cost,
            destination_subtotal,
            breakdown,
            per_person_total,
            group_total,
            lesson_ratio,
        })
    }

    /// Cost of a per-day item over `count` days, destination currency.
    fn daily_cost(
        &self,
        per_day: Decimal,
        count: u32,
        what: &'static str,
    ) -> Result<Decimal, BudgetError> {
        per_day
            .checked_mul(Decimal::from(count))
            .ok_or(BudgetError::Overflow(what))
    }

    /// Sum of the destination-currency categories.
    fn destination_subtotal(
        &self,
        parts: &[Decimal],
    ) -> Result<Decimal, BudgetError> {
        parts
            .iter()
            .try_fold(Decimal::ZERO, |acc, part| acc.checked_add(*part))
            .ok_or(BudgetError::Overflow("destination subtotal"))
    }

    /// Converts a destination-currency amount to origin currency.
    fn convert(
        &self,
        amount: Decimal,
        rate: Decimal,
        what: &'static str,
    ) -> Result<Decimal, BudgetError> {
        amount.checked_mul(rate).ok_or(BudgetError::Overflow(what))
    }

    fn group_total(
        &self,
        per_person_total: Decimal,
        people: u32,
    ) -> Result<Decimal, BudgetError> {
        if people == 0 {
            return Err(BudgetError::InvalidPeople(people));
        }
        per_person_total
            .checked_mul(Decimal::from(people))
            .ok_or(BudgetError::Overflow("group total"))
    }
}
