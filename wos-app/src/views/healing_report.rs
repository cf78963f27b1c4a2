use std::fmt::Write;

use wos_core::calculations::{HealingError, HealingResult, SECONDS_PER_HEAL_CYCLE};
use wos_core::format::group_thousands;

/// Renders a successful healing plan.
pub fn render_healing_result(result: &HealingResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Wounded per batch: {}",
        group_thousands(result.wounded_per_batch.into())
    );
    if let Some(cycles) = result.required_cycles {
        let _ = writeln!(out, "Required cycles:   {}", group_thousands(cycles.into()));
    }
    if let Some(total_time) = &result.total_time {
        let _ = writeln!(
            out,
            "Total time:        {total_time} ({SECONDS_PER_HEAL_CYCLE}s per cycle)"
        );
    }
    out
}

pub fn render_healing_error(error: &HealingError) -> String {
    format!("Error: {error}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn batch_only() {
        let result = HealingResult {
            wounded_per_batch: 8333,
            required_cycles: None,
            total_time: None,
        };

        assert_eq!(render_healing_result(&result), "Wounded per batch: 8,333\n");
    }

    #[test]
    fn batch_with_cycles() {
        let result = HealingResult {
            wounded_per_batch: 8333,
            required_cycles: Some(61),
            total_time: Some("3m 3s".to_string()),
        };

        assert_eq!(
            render_healing_result(&result),
            "Wounded per batch: 8,333\nRequired cycles:   61\nTotal time:        3m 3s (3s per cycle)\n"
        );
    }

    #[test]
    fn error_uses_the_validation_message() {
        assert_eq!(
            render_healing_error(&HealingError::InvalidHelpers),
            "Error: Please enter a valid number of helpers (1-45)."
        );
    }
}
