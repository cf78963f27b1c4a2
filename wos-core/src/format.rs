//! Display formatting shared by every front end.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{round_half_up, to_whole_u64};
use crate::models::ItemCategory;

/// Placeholder shown for a requirement of zero.
pub const EMPTY_REQUIREMENT: &str = "—";

/// Largest highlight opacity, in percent.
pub const MAX_HIGHLIGHT_ALPHA: i64 = 25;

/// Formats a number of minutes, adding a day/hour/minute breakdown once the
/// total reaches an hour.
///
/// # Examples
///
/// ```
/// use wos_core::format::format_minutes;
///
/// assert_eq!(format_minutes(45), "45 min");
/// assert_eq!(format_minutes(90), "90 min (1h 30m)");
/// assert_eq!(format_minutes(1440), "1440 min (1d)");
/// ```
pub fn format_minutes(total: u64) -> String {
    let minutes = total % 60;
    let hours = (total / 60) % 24;
    let days = total / 1440;

    if days == 0 && hours == 0 {
        return format!("{total} min");
    }

    let parts: Vec<String> = [(days, "d"), (hours, "h"), (minutes, "m")]
        .into_iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect();

    format!("{total} min ({})", parts.join(" "))
}

/// Formats seconds as `"Xm Ys"`.
pub fn format_cycle_time(total_seconds: u64) -> String {
    format!("{}m {}s", total_seconds / 60, total_seconds % 60)
}

/// Groups the integer part with commas and keeps at most three decimals.
///
/// ```
/// use rust_decimal_macros::dec;
/// use wos_core::format::group_thousands;
///
/// assert_eq!(group_thousands(dec!(1234567)), "1,234,567");
/// assert_eq!(group_thousands(dec!(-2500.1256)), "-2,500.126");
/// ```
pub fn group_thousands(value: Decimal) -> String {
    let rounded = value.round_dp(3).normalize();
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

/// Renders the units of an item still needed to reach a goal.
///
/// Speedups are counted in minutes and shown as a duration.
pub fn format_required(
    category: ItemCategory,
    required: Decimal,
) -> String {
    if required <= Decimal::ZERO {
        return EMPTY_REQUIREMENT.to_string();
    }
    match category {
        ItemCategory::Speedup => format_minutes(to_whole_u64(required)),
        _ => group_thousands(required),
    }
}

/// Green row highlight scaled by how much a row contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    /// Opacity in whole percent, `0..=25`.
    pub alpha_percent: u8,
}

impl Highlight {
    /// CSS colour for the highlight.
    pub fn css(&self) -> String {
        let alpha = Decimal::new(i64::from(self.alpha_percent), 2).normalize();
        format!("rgba(30, 180, 90, {alpha})")
    }
}

impl fmt::Display for Highlight {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.css())
    }
}

/// Highlight for a row that earned `earned` when the best row of the stage
/// earned `max_earned`. `None` when nothing was earned at all.
///
/// ```
/// use rust_decimal_macros::dec;
/// use wos_core::format::background_style;
///
/// let style = background_style(dec!(50), dec!(100)).unwrap();
/// assert_eq!(style.css(), "rgba(30, 180, 90, 0.13)");
/// assert!(background_style(dec!(0), dec!(0)).is_none());
/// ```
pub fn background_style(
    earned: Decimal,
    max_earned: Decimal,
) -> Option<Highlight> {
    if max_earned.is_zero() {
        return None;
    }
    let intensity = earned.checked_div(max_earned)?;
    let alpha = round_half_up(intensity.checked_mul(Decimal::from(MAX_HIGHLIGHT_ALPHA))?)
        .to_i64()
        .unwrap_or(0)
        .clamp(0, MAX_HIGHLIGHT_ALPHA);

    Some(Highlight {
        alpha_percent: u8::try_from(alpha).unwrap_or(0),
    })
}
