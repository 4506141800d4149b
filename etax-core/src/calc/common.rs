//! Shared arithmetic helpers for the tax calculators.

use rust_decimal::Decimal;

/// Rounds a monetary value to two decimal places, half-up.
///
/// Midpoints round away from zero, which is the convention used on the
/// annual declaration forms (0.005 лв. becomes 0.01 лв.).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use etax_core::calc::round_half_up;
///
/// assert_eq!(round_half_up(dec!(66.224)), dec!(66.22));
/// assert_eq!(round_half_up(dec!(66.225)), dec!(66.23));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the larger of two decimal values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Clamps a value to be non-negative.
///
/// Percentages and deductions entered by the user must never subtract less
/// than nothing; a negative input is treated as zero.
pub fn non_negative(value: Decimal) -> Decimal {
    if value < Decimal::ZERO {
        Decimal::ZERO
    } else {
        value
    }
}
