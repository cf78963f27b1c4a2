//! Common numeric helpers shared by the calculators.
//!
//! All calculator arithmetic runs on [`Decimal`]; these helpers provide the
//! whole-number rounding the calculators display.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

/// Rounds to the nearest whole number, with halves rounded up
/// (towards positive infinity).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use wos_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(8333.33)), dec!(8333));
/// assert_eq!(round_half_up(dec!(2.5)), dec!(3));
/// assert_eq!(round_half_up(dec!(-2.5)), dec!(-2));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value
        .checked_add(dec!(0.5))
        .map_or_else(|| value.round(), |shifted| shifted.floor())
}

/// Divides and rounds up to the next whole number.
///
/// Returns `None` when `denominator` is zero or the quotient overflows.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use wos_core::calculations::common::ceil_div;
///
/// assert_eq!(ceil_div(dec!(10), dec!(3)), Some(dec!(4)));
/// assert_eq!(ceil_div(dec!(9), dec!(3)), Some(dec!(3)));
/// assert_eq!(ceil_div(dec!(9), dec!(0)), None);
/// ```
pub fn ceil_div(
    numerator: Decimal,
    denominator: Decimal,
) -> Option<Decimal> {
    numerator.checked_div(denominator).map(|q| q.ceil())
}

/// Clamps negative values to zero.
pub fn clamp_to_zero(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Converts a whole, non-negative decimal into a `u64`, saturating on
/// values outside the `u64` range.
pub fn to_whole_u64(value: Decimal) -> u64 {
    if value.is_sign_negative() {
        return 0;
    }
    value.trunc().to_u64().unwrap_or(u64::MAX)
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
        assert_eq!(round_half_up(dec!(8333.33)), dec!(8333));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(0.5)), dec!(1));
    }

    #[test]
    fn round_half_up_rounds_negative_midpoint_towards_positive() {
        assert_eq!(round_half_up(dec!(-0.5)), dec!(0));
    }

    #[test]
    fn round_half_up_at_decimal_limits() {
        assert_eq!(round_half_up(Decimal::MAX), Decimal::MAX);
        assert_eq!(round_half_up(Decimal::MIN), Decimal::MIN);
    }

    #[test]
    fn round_half_up_preserves_whole_values() {
        assert_eq!(round_half_up(dec!(25)), dec!(25));
    }

    // =========================================================================
    // ceil_div tests
    // =========================================================================

    #[test]
    fn ceil_div_rounds_partial_quotient_up() {
        assert_eq!(ceil_div(dec!(200000), dec!(3)), Some(dec!(66667)));
    }

    #[test]
    fn ceil_div_rejects_zero_denominator() {
        assert_eq!(ceil_div(dec!(1), Decimal::ZERO), None);
    }

    // =========================================================================
    // clamp / conversion tests
    // =========================================================================

    #[test]
    fn clamp_to_zero_drops_negative_values() {
        assert_eq!(clamp_to_zero(dec!(-12.5)), Decimal::ZERO);
        assert_eq!(clamp_to_zero(dec!(12.5)), dec!(12.5));
    }

    #[test]
    fn to_whole_u64_truncates_and_saturates() {
        assert_eq!(to_whole_u64(dec!(1440)), 1440);
        assert_eq!(to_whole_u64(dec!(-3)), 0);
        assert_eq!(to_whole_u64(dec!(79228162514264337593543950335)), u64::MAX);
    }
}
