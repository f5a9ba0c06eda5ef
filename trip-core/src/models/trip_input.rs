use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::LessonPlan;
use crate::calculations::BudgetError;

/// Parameters of one trip, as entered by the traveller.
///
/// Flight cost is in origin currency; every other amount is in destination
/// currency. All amounts are per person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripBudgetInput {
    /// Trip duration in calendar days, arrival and departure included.
    pub days: u32,

    /// Party size.
    pub people: u32,

    /// Return flight, origin currency.
    pub flight_cost: Decimal,

    pub accommodation_per_night: Decimal,

    pub lift_ticket_per_day: Decimal,

    pub food_per_day: Decimal,

    #[serde(default)]
    pub lesson: LessonPlan,

    /// Origin-currency units per destination-currency unit.
    pub exchange_rate: Decimal,
}

impl TripBudgetInput {
    /// Checks every constraint the estimator relies on.
    ///
    /// Out-of-range values are rejected, never clamped.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetError`] if:
    /// - `days` or `people` is zero
    /// - `exchange_rate` is zero or negative
    /// - any monetary amount is negative
    /// - a split private instructor is booked for more days than the trip
    pub fn validate(&self) -> Result<(), BudgetError> {
        if self.days < 1 {
            return Err(BudgetError::InvalidDays(self.days));
        }
        if self.people < 1 {
            return Err(BudgetError::InvalidPeople(self.people));
        }
        if self.exchange_rate <= Decimal::ZERO {
            return Err(BudgetError::InvalidExchangeRate(self.exchange_rate));
        }

        let amounts = [
            ("flight_cost", self.flight_cost),
            ("accommodation_per_night", self.accommodation_per_night),
            ("lift_ticket_per_day", self.lift_ticket_per_day),
            ("food_per_day", self.food_per_day),
        ];
        for (field, value) in amounts {
            if value < Decimal::ZERO {
                return Err(BudgetError::NegativeAmount { field, value });
            }
        }

        match self.lesson {
            LessonPlan::None => {}
            LessonPlan::FlatPackage { fee } => {
                if fee < Decimal::ZERO {
                    return Err(BudgetError::NegativeAmount {
                        field: "lesson_fee",
                        value: fee,
                    });
                }
            }
            LessonPlan::SplitPrivateInstructor {
                daily_rate,
                lesson_days,
            } => {
                if daily_rate < Decimal::ZERO {
                    return Err(BudgetError::NegativeAmount {
                        field: "instructor_daily_rate",
                        value: daily_rate,
                    });
                }
                if lesson_days > self.days {
                    return Err(BudgetError::LessonDaysExceedTrip {
                        lesson_days,
                        days: self.days,
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn valid_input() -> TripBudgetInput {
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
    }

    #[test]
    fn validate_accepts_valid_input() {
        assert_eq!(valid_input().validate(), Ok(()));
    }

    #[test]
    fn validate_accepts_single_day_single_person() {
        let input = TripBudgetInput {
            days: 1,
            people: 1,
            ..valid_input()
        };

        assert_eq!(input.validate(), Ok(()));
    }

    #[test]
    fn validate_accepts_zero_amounts() {
        let input = TripBudgetInput {
            flight_cost: dec!(0),
            food_per_day: dec!(0),
            ..valid_input()
        };

        assert_eq!(input.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_zero_days() {
        let input = TripBudgetInput {
            days: 0,
            ..valid_input()
        };

        assert_eq!(input.validate(), Err(BudgetError::InvalidDays(0)));
    }

    #[test]
    fn validate_rejects_zero_people() {
        let input = TripBudgetInput {
            people: 0,
            ..valid_input()
        };

        assert_eq!(input.validate(), Err(BudgetError::InvalidPeople(0)));
    }

    #[test]
    fn validate_rejects_zero_exchange_rate() {
        let input = TripBudgetInput {
            exchange_rate: dec!(0),
            ..valid_input()
        };

        assert_eq!(
            input.validate(),
            Err(BudgetError::InvalidExchangeRate(dec!(0)))
        );
    }

    #[test]
    fn validate_rejects_negative_exchange_rate() {
        let input = TripBudgetInput {
            exchange_rate: dec!(-0.22),
            ..valid_input()
        };

        assert_eq!(
            input.validate(),
            Err(BudgetError::InvalidExchangeRate(dec!(-0.22)))
        );
    }

    #[test]
    fn validate_rejects_negative_amount_and_names_field() {
        let input = TripBudgetInput {
            lift_ticket_per_day: dec!(-1),
            ..valid_input()
        };

        assert_eq!(
            input.validate(),
            Err(BudgetError::NegativeAmount {
                field: "lift_ticket_per_day",
                value: dec!(-1),
            })
        );
    }

    #[test]
    fn validate_rejects_negative_lesson_fee() {
        let input = TripBudgetInput {
            lesson: LessonPlan::FlatPackage { fee: dec!(-5) },
            ..valid_input()
        };

        assert_eq!(
            input.validate(),
            Err(BudgetError::NegativeAmount {
                field: "lesson_fee",
                value: dec!(-5),
            })
        );
    }

    #[test]
    fn validate_rejects_negative_instructor_rate() {
        let input = TripBudgetInput {
            lesson: LessonPlan::SplitPrivateInstructor {
                daily_rate: dec!(-90000),
                lesson_days: 2,
            },
            ..valid_input()
        };

        assert_eq!(
            input.validate(),
            Err(BudgetError::NegativeAmount {
                field: "instructor_daily_rate",
                value: dec!(-90000),
            })
        );
    }

    #[test]
    fn validate_rejects_lesson_days_beyond_trip() {
        let input = TripBudgetInput {
            lesson: LessonPlan::SplitPrivateInstructor {
                daily_rate: dec!(90000),
                lesson_days: 6,
            },
            ..valid_input()
        };

        assert_eq!(
            input.validate(),
            Err(BudgetError::LessonDaysExceedTrip {
                lesson_days: 6,
                days: 5,
            })
        );
    }

    #[test]
    fn validate_accepts_lesson_days_equal_to_trip() {
        let input = TripBudgetInput {
            lesson: LessonPlan::SplitPrivateInstructor {
                daily_rate: dec!(90000),
                lesson_days: 5,
            },
            ..valid_input()
        };

        assert_eq!(input.validate(), Ok(()));
    }
}
