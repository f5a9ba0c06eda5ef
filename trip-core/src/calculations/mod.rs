//! Budget calculation for a ski trip.
//!
//! The estimator is a pure function of a [`TripBudgetInput`](crate::TripBudgetInput)
//! and a [`DayCountPolicy`](crate::DayCountPolicy). Rounding helpers used by
//! presentation layers live in [`common`].

pub mod budget;
pub mod common;

pub use budget::{BudgetError, BudgetEstimator};
pub use common::{ratio, round_currency};
