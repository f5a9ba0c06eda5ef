use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::BudgetError;

/// How lessons are paid for on a trip.
///
/// All variants resolve to a per-person cost in destination currency via
/// [`LessonPlan::per_person_cost`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LessonPlan {
    /// No instruction booked.
    #[default]
    None,

    /// A single per-person fee covering the whole program, such as a
    /// multi-day camp or a certification course.
    FlatPackage { fee: Decimal },

    /// One private instructor hired by the day and shared by the party.
    /// The instructor's total is split evenly across everyone.
    SplitPrivateInstructor { daily_rate: Decimal, lesson_days: u32 },
}

impl LessonPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::FlatPackage { .. } => "flat-package",
            Self::SplitPrivateInstructor { .. } => "split-private-instructor",
        }
    }

    /// Per-person lesson cost in destination currency.
    ///
    /// # Errors
    ///
    /// * [`BudgetError::InvalidPeople`] when the instructor cost would be split
    ///   across zero people.
    /// * [`BudgetError::Overflow`] when the instructor total does not fit in a
    ///   [`Decimal`].
    pub fn per_person_cost(
        &self,
        people: u32,
    ) -> Result<Decimal, BudgetError> {
        match *self {
            Self::None => Ok(Decimal::ZERO),
            Self::FlatPackage { fee } => Ok(fee),
            Self::SplitPrivateInstructor {
                daily_rate,
                lesson_days,
            } => {
                if people == 0 {
                    return Err(BudgetError::InvalidPeople(people));
                }
                daily_rate
                    .checked_mul(Decimal::from(lesson_days))
                    .and_then(|total| total.checked_div(Decimal::from(people)))
                    .ok_or(BudgetError::Overflow("lesson cost"))
            }
        }
    }
}
