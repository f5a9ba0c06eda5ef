//! Common helpers for budget arithmetic.
//!
//! The estimator itself never rounds. These helpers are for the layers that
//! present its results.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a value to `dp` decimal places using half-up rounding.
///
/// Values exactly at the midpoint are rounded away from zero, the usual
/// convention for displaying money.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use trip_core::calculations::common::round_currency;
///
/// assert_eq!(round_currency(dec!(143219.5), 0), dec!(143220));
/// assert_eq!(round_currency(dec!(45000.333), 2), dec!(45000.33));
/// assert_eq!(round_currency(dec!(-0.005), 2), dec!(-0.01)); // Away from zero
/// ```
pub fn round_currency(
    value: Decimal,
    dp: u32,
) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Divides `part` by `whole`, returning `None` when `whole` is zero or the
/// quotient is not representable.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use trip_core::calculations::common::ratio;
///
/// assert_eq!(ratio(dec!(33000), dec!(132000)), Some(dec!(0.25)));
/// assert_eq!(ratio(dec!(1), dec!(0)), None);
/// ```
pub fn ratio(
    part: Decimal,
    whole: Decimal,
) -> Option<Decimal> {
    if whole.is_zero() {
        return None;
    }
    part.checked_div(whole)
}
