use rust_decimal::Decimal;
use thiserror::Error;
use trip_core::calculations::round_currency;
use trip_core::{NightsPolicy, SkiDaysPolicy};

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid amount '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a command-line amount into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"150,000"`). Unlike a form
/// field, an empty argument is an error rather than zero.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    normalized.parse().map_err(|e| {
        tracing::debug!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

pub fn parse_nights_policy(s: &str) -> Result<NightsPolicy, String> {
    NightsPolicy::parse(s)
        .ok_or_else(|| format!("expected 'every-day' or 'exclude-departure-day', got '{s}'"))
}

pub fn parse_ski_days_policy(s: &str) -> Result<SkiDaysPolicy, String> {
    SkiDaysPolicy::parse(s)
        .ok_or_else(|| format!("expected 'every-day' or 'exclude-travel-days', got '{s}'"))
}

/// Formats an amount with `dp` decimal places and comma thousands separators.
///
/// `143219.5` with `dp = 0` becomes `"143,220"`.
pub fn format_amount(
    value: Decimal,
    dp: u32,
) -> String {
    let mut rounded = round_currency(value, dp);
    rounded.rescale(dp);
    let text = rounded.abs().to_string();

    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(text.len() + int_part.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        grouped.push('-');
    }
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }
    grouped
}

/// Formats a ratio in `[0, 1]` as a percentage with one decimal place.
pub fn format_percent(ratio: Decimal) -> String {
    let mut percent = round_currency(ratio * Decimal::ONE_HUNDRED, 1);
    percent.rescale(1);
    format!("{percent}%")
}
