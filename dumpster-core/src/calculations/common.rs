//! Common utility functions for quote calculations.
//!
//! Money is carried at full precision through every calculation and only
//! rounded here, when it is displayed or handed to a collaborator.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use dumpster_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(625.3125)), dec!(625.31));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the larger of two decimal values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Returns the smaller of two decimal values.
pub fn min(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a < b { a } else { b }
}

/// Formats a currency amount with exactly two decimals, e.g. `"575.00"`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use dumpster_core::calculations::common::format_amount;
///
/// assert_eq!(format_amount(dec!(575)), "575.00");
/// assert_eq!(format_amount(dec!(50.3125)), "50.31");
/// ```
pub fn format_amount(value: Decimal) -> String {
    let mut rounded = round_half_up(value);
    rounded.rescale(2);
    rounded.to_string()
}

/// Formats a currency amount for people, e.g. `"$1,303.50"`.
pub fn format_currency(value: Decimal) -> String {
    let plain = format_amount(value.abs());
    let (whole, cents) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value.is_sign_negative() && !round_half_up(value).is_zero() { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

/// Formats a fractional tax rate as a percentage with three decimals.
///
/// ```
/// use rust_decimal_macros::dec;
/// use dumpster_core::calculations::common::format_tax_rate;
///
/// assert_eq!(format_tax_rate(dec!(0.08875)), "8.875%");
/// assert_eq!(format_tax_rate(dec!(0.0875)), "8.750%");
/// ```
pub fn format_tax_rate(rate: Decimal) -> String {
    let mut percent =
        (rate * Decimal::ONE_HUNDRED).round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero);
    percent.rescale(3);
    format!("{percent}%")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        assert_eq!(round_half_up(dec!(50.3125)), dec!(50.31));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
    }

    #[test]
    fn round_half_up_preserves_already_rounded_values() {
        assert_eq!(round_half_up(dec!(575.00)), dec!(575.00));
    }

    // =========================================================================
    // min / max tests
    // =========================================================================

    #[test]
    fn max_returns_larger_value() {
        assert_eq!(max(dec!(-15.00), dec!(0)), dec!(0));
        assert_eq!(max(dec!(200.00), dec!(100.00)), dec!(200.00));
    }

    #[test]
    fn min_returns_smaller_value() {
        assert_eq!(min(dec!(100.00), dec!(625.3125)), dec!(100.00));
        assert_eq!(min(dec!(900.00), dec!(625.3125)), dec!(625.3125));
    }

    // =========================================================================
    // formatting tests
    // =========================================================================

    #[test]
    fn format_amount_pads_whole_numbers() {
        assert_eq!(format_amount(dec!(0)), "0.00");
        assert_eq!(format_amount(dec!(625.3125)), "625.31");
    }

    #[test]
    fn format_currency_groups_thousands() {
        assert_eq!(format_currency(dec!(1303.5)), "$1,303.50");
        assert_eq!(format_currency(dec!(1000000)), "$1,000,000.00");
        assert_eq!(format_currency(dec!(999.999)), "$1,000.00");
    }

    #[test]
    fn format_currency_marks_negative_amounts() {
        assert_eq!(format_currency(dec!(-25)), "-$25.00");
        assert_eq!(format_currency(dec!(-0.001)), "$0.00");
    }

    #[test]
    fn format_tax_rate_uses_three_decimals() {
        assert_eq!(format_tax_rate(dec!(0.08875)), "8.875%");
        assert_eq!(format_tax_rate(dec!(0)), "0.000%");
    }
}
