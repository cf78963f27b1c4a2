use std::{fmt, sync::Arc, time::Duration};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use wos_core::calculations::{HealingError, HealingInput, HealingResult, calculate_healing, evaluate};
use wos_core::models::CalculatorKind;
use wos_core::store::persistence::load_json;
use wos_core::store::{Autosaver, KeyValueStore};

use crate::utils::{parse_int_like, parse_optional_int};

/// Fallback ally help time, in seconds.
const DEFAULT_ALLY_HELP_TIME: i64 = 257;

/// The healing calculator's fields, exactly as typed.
///
/// Persisted as-is under the healing storage key so a half-filled form
/// survives a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealingForm {
    pub wounded: String,
    pub days: String,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
    pub helpers: String,
    pub ally_help_time: String,
    pub total_wounded: String,
}

impl Default for HealingForm {
    fn default() -> Self {
        Self {
            wounded: String::new(),
            days: "0".to_string(),
            hours: "0".to_string(),
            minutes: "0".to_string(),
            seconds: "0".to_string(),
            helpers: "1".to_string(),
            ally_help_time: DEFAULT_ALLY_HELP_TIME.to_string(),
            total_wounded: String::new(),
        }
    }
}

impl HealingForm {
    /// The saved form, or the defaults when nothing usable is stored.
    pub async fn load(store: &dyn KeyValueStore) -> Self {
        load_json(store, CalculatorKind::Healing.storage_key())
            .await
            .unwrap_or_default()
    }

    /// Converts the text fields into calculator input.
    ///
    /// Integers are read from their leading digits. Unreadable or zero
    /// values fall back: time and wounded to 0, helpers to 1, ally help
    /// time to 257. A blank total wounded means no total.
    pub fn to_input(&self) -> HealingInput {
        let int_or = |text: &str, fallback: i64| {
            parse_int_like(text)
                .filter(|value| *value != 0)
                .unwrap_or(fallback)
        };

        let ally_help_time = evaluate(&self.ally_help_time);
        let ally_help_time = if ally_help_time.is_zero() {
            Decimal::from(DEFAULT_ALLY_HELP_TIME)
        } else {
            ally_help_time
        };

        HealingInput {
            wounded: int_or(&self.wounded, 0),
            days: int_or(&self.days, 0),
            hours: int_or(&self.hours, 0),
            minutes: int_or(&self.minutes, 0),
            seconds: int_or(&self.seconds, 0),
            helpers: int_or(&self.helpers, 1),
            ally_help_time,
            total_wounded: parse_optional_int(&self.total_wounded),
        }
    }

    pub fn calculate(&self) -> Result<HealingResult, HealingError> {
        calculate_healing(&self.to_input())
    }
}

impl fmt::Display for HealingForm {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "Wounded:        {}", self.wounded)?;
        writeln!(
            f,
            "Healing time:   {}d {}h {}m {}s",
            self.days, self.hours, self.minutes, self.seconds
        )?;
        writeln!(f, "Helpers:        {}", self.helpers)?;
        writeln!(f, "Ally help time: {}s", self.ally_help_time)?;
        writeln!(
            f,
            "Total wounded:  {}",
            if self.total_wounded.trim().is_empty() {
                "-"
            } else {
                self.total_wounded.as_str()
            }
        )
    }
}

/// Debounced persistence for a [`HealingForm`].
pub fn healing_autosaver(
    store: Arc<dyn KeyValueStore>,
    delay: Duration,
) -> Autosaver {
    Autosaver::for_calculator(store, CalculatorKind::Healing, delay)
}
