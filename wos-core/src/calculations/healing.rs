//! Healing batch planning.
//!
//! Given how long a batch of wounded troops takes to heal and how much each
//! alliance help shortens it, works out how many wounded to queue per batch so
//! that the alliance helps finish the batch outright. With a total wounded
//! count it also plans the number of heal cycles and their wall-clock time.
//!
//! ```text
//! target_seconds    = helpers × ally_help_time
//! wounded_per_batch = round(wounded × target_seconds / healing_seconds)
//! required_cycles   = ceil(total_wounded / wounded_per_batch)
//! total_time        = required_cycles × 3 s
//! ```
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use wos_core::calculations::{HealingInput, calculate_healing};
//!
//! let input = HealingInput {
//!     wounded: 1000,
//!     minutes: 3,
//!     helpers: 10,
//!     ally_help_time: dec!(150),
//!     total_wounded: Some(50000),
//!     ..HealingInput::default()
//! };
//!
//! let result = calculate_healing(&input).unwrap();
//!
//! assert_eq!(result.wounded_per_batch, 8333);
//! assert_eq!(result.required_cycles, Some(7));
//! assert_eq!(result.total_time.as_deref(), Some("0m 21s"));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::calculations::common::{ceil_div, round_half_up, to_whole_u64};
use crate::format::format_cycle_time;

/// Seconds one heal-and-help cycle takes in game.
pub const SECONDS_PER_HEAL_CYCLE: u64 = 3;

pub const MAX_WOUNDED: i64 = 999_999;
pub const MAX_HELPERS: i64 = 45;
/// Longest single alliance help, in seconds.
pub const MAX_ALLY_HELP_SECONDS: i64 = 257;

/// Validation failures. The `Display` text is shown to the user as is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HealingError {
    #[error("Please enter a valid number of wounded troops (1-999,999).")]
    InvalidWounded,

    #[error("Please enter a valid number of helpers (1-45).")]
    InvalidHelpers,

    #[error("Please enter a valid ally help time (1-257 seconds).")]
    InvalidAllyHelpTime,

    #[error("Please enter valid time values.")]
    InvalidTime,

    #[error("Please enter a valid total wounded amount (1-999,999).")]
    InvalidTotalWounded,

    #[error("Please enter a valid healing time greater than 0.")]
    ZeroHealingTime,

    /// The batch rounds to zero wounded, so no number of cycles clears the
    /// total.
    #[error(
        "Healing batch size is too small to plan cycles; add helpers or reduce the healing time."
    )]
    BatchTooSmall,
}

/// Healing calculator inputs as entered in the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealingInput {
    /// Wounded troops in the sample heal whose time was read off the game.
    pub wounded: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub helpers: i64,
    /// Seconds removed by one alliance help.
    pub ally_help_time: Decimal,
    pub total_wounded: Option<i64>,
}

impl Default for HealingInput {
    fn default() -> Self {
        Self {
            wounded: 0,
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
            helpers: 1,
            ally_help_time: Decimal::from(MAX_ALLY_HELP_SECONDS),
            total_wounded: None,
        }
    }
}

impl HealingInput {
    /// Total healing time in seconds.
    pub fn healing_seconds(&self) -> i64 {
        self.days * 86_400 + self.hours * 3_600 + self.minutes * 60 + self.seconds
    }

    /// Checks every field, in the order the form reports them.
    pub fn validate(&self) -> Result<(), HealingError> {
        if !(1..=MAX_WOUNDED).contains(&self.wounded) {
            return Err(HealingError::InvalidWounded);
        }
        if !(1..=MAX_HELPERS).contains(&self.helpers) {
            return Err(HealingError::InvalidHelpers);
        }
        if self.ally_help_time < Decimal::ONE
            || self.ally_help_time > Decimal::from(MAX_ALLY_HELP_SECONDS)
        {
            return Err(HealingError::InvalidAllyHelpTime);
        }
        if !(0..=31).contains(&self.days)
            || !(0..=23).contains(&self.hours)
            || !(0..=59).contains(&self.minutes)
            || !(0..=59).contains(&self.seconds)
        {
            return Err(HealingError::InvalidTime);
        }
        if let Some(total) = self.total_wounded {
            if !(1..=MAX_WOUNDED).contains(&total) {
                return Err(HealingError::InvalidTotalWounded);
            }
        }
        if self.healing_seconds() <= 0 {
            return Err(HealingError::ZeroHealingTime);
        }
        Ok(())
    }
}

/// Planned batch size, plus cycle planning when a total was given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealingResult {
    pub wounded_per_batch: u64,
    pub required_cycles: Option<u64>,
    /// Cycle time rendered as `"Xm Ys"`.
    pub total_time: Option<String>,
}

/// Plans a healing batch.
///
/// # Errors
///
/// Returns the first [`HealingError`] found by [`HealingInput::validate`], or
/// [`HealingError::BatchTooSmall`] when a total is given but the batch rounds
/// to zero wounded.
pub fn calculate_healing(input: &HealingInput) -> Result<HealingResult, HealingError> {
    input.validate()?;

    let healing_seconds = Decimal::from(input.healing_seconds());
    let target_seconds = Decimal::from(input.helpers) * input.ally_help_time;
    let batch = round_half_up(Decimal::from(input.wounded) * target_seconds / healing_seconds);
    let wounded_per_batch = to_whole_u64(batch);

    let Some(total_wounded) = input.total_wounded else {
        if wounded_per_batch == 0 {
            warn!(
                wounded = input.wounded,
                helpers = input.helpers,
                healing_seconds = %healing_seconds,
                "healing batch rounds to zero wounded"
            );
        }
        return Ok(HealingResult {
            wounded_per_batch,
            required_cycles: None,
            total_time: None,
        });
    };

    if wounded_per_batch == 0 {
        return Err(HealingError::BatchTooSmall);
    }

    let required_cycles = ceil_div(Decimal::from(total_wounded), batch)
        .map(to_whole_u64)
        .ok_or(HealingError::BatchTooSmall)?;
    let total_seconds = required_cycles.saturating_mul(SECONDS_PER_HEAL_CYCLE);

    Ok(HealingResult {
        wounded_per_batch,
        required_cycles: Some(required_cycles),
        total_time: Some(format_cycle_time(total_seconds)),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn sample_input() -> HealingInput {
        HealingInput {
            wounded: 1000,
            minutes: 3,
            helpers: 10,
            ally_help_time: dec!(150),
            ..HealingInput::default()
        }
    }

    // =========================================================================
    // batch size tests
    // =========================================================================

    #[test]
    fn batch_size_for_three_minute_heal() {
        let result = calculate_healing(&sample_input()).unwrap();

        assert_eq!(
            result,
            HealingResult {
                wounded_per_batch: 8333,
                required_cycles: None,
                total_time: None,
            }
        );
    }

    #[test]
    fn batch_size_rounds_half_up() {
        // 1 × 1 × 1 / 2 = 0.5
        let input = HealingInput {
            wounded: 1,
            seconds: 2,
            helpers: 1,
            ally_help_time: dec!(1),
            ..HealingInput::default()
        };

        assert_eq!(calculate_healing(&input).unwrap().wounded_per_batch, 1);
    }

    #[test]
    fn zero_batch_without_total_is_reported_not_rejected() {
        let input = HealingInput {
            wounded: 1,
            days: 31,
            helpers: 1,
            ally_help_time: dec!(1),
            ..HealingInput::default()
        };

        assert_eq!(calculate_healing(&input).unwrap().wounded_per_batch, 0);
    }

    // =========================================================================
    // cycle planning tests
    // =========================================================================

    #[test]
    fn cycles_and_total_time_with_total_wounded() {
        let input = HealingInput {
            total_wounded: Some(500000),
            ..sample_input()
        };

        let result = calculate_healing(&input).unwrap();

        // ceil(500000 / 8333) = 61 cycles, 183 s
        assert_eq!(result.required_cycles, Some(61));
        assert_eq!(result.total_time.as_deref(), Some("3m 3s"));
    }

    #[test]
    fn zero_batch_with_total_is_an_error() {
        let input = HealingInput {
            wounded: 1,
            days: 31,
            helpers: 1,
            ally_help_time: dec!(1),
            total_wounded: Some(10),
            ..HealingInput::default()
        };

        assert_eq!(calculate_healing(&input), Err(HealingError::BatchTooSmall));
    }

    // =========================================================================
    // validation tests
    // =========================================================================

    #[test]
    fn rejects_zero_wounded() {
        let input = HealingInput {
            wounded: 0,
            ..sample_input()
        };

        let err = calculate_healing(&input).unwrap_err();

        assert_eq!(err, HealingError::InvalidWounded);
        assert_eq!(
            err.to_string(),
            "Please enter a valid number of wounded troops (1-999,999)."
        );
    }

    #[test]
    fn rejects_too_many_helpers() {
        let input = HealingInput {
            helpers: 50,
            ..sample_input()
        };

        assert_eq!(calculate_healing(&input), Err(HealingError::InvalidHelpers));
    }

    #[test]
    fn rejects_ally_help_time_out_of_range() {
        for ally_help_time in [dec!(0), dec!(257.5), dec!(300)] {
            let input = HealingInput {
                ally_help_time,
                ..sample_input()
            };

            assert_eq!(calculate_healing(&input), Err(HealingError::InvalidAllyHelpTime));
        }
    }

    #[test]
    fn rejects_out_of_range_time_components() {
        let bad = [
            HealingInput { days: 32, ..sample_input() },
            HealingInput { hours: 24, ..sample_input() },
            HealingInput { minutes: 60, ..sample_input() },
            HealingInput { seconds: -1, ..sample_input() },
        ];

        for input in bad {
            assert_eq!(calculate_healing(&input), Err(HealingError::InvalidTime));
        }
    }

    #[test]
    fn rejects_total_wounded_out_of_range() {
        let input = HealingInput {
            total_wounded: Some(1_000_000),
            ..sample_input()
        };

        assert_eq!(calculate_healing(&input), Err(HealingError::InvalidTotalWounded));
    }

    #[test]
    fn rejects_zero_healing_time() {
        let input = HealingInput {
            minutes: 0,
            ..sample_input()
        };

        assert_eq!(calculate_healing(&input), Err(HealingError::ZeroHealingTime));
    }

    #[test]
    fn wounded_is_checked_before_helpers() {
        let input = HealingInput {
            wounded: 0,
            helpers: 0,
            ..sample_input()
        };

        assert_eq!(calculate_healing(&input), Err(HealingError::InvalidWounded));
    }
}
