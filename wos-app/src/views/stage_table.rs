use std::fmt::Write;

use rust_decimal::Decimal;
use wos_core::format::{MAX_HIGHLIGHT_ALPHA, group_thousands};

use crate::state::{RowView, StageView};

const LABEL_WIDTH: usize = 34;

/// Width of the contribution bar at full highlight.
const BAR_WIDTH: u8 = 5;

fn bar(row: &RowView) -> String {
    let alpha = row.highlight.map(|h| h.alpha_percent).unwrap_or(0);
    let filled = (u16::from(alpha) * u16::from(BAR_WIDTH) / MAX_HIGHLIGHT_ALPHA as u16) as usize;
    "#".repeat(filled)
}

fn label(row: &RowView) -> String {
    match &row.level {
        Some(level) => format!("{} [{level}]", row.label),
        None => row.label.clone(),
    }
}

fn or_dash(text: &str) -> &str {
    if text.trim().is_empty() { "-" } else { text }
}

/// Renders one stage as a table followed by its totals.
pub fn render_stage(
    calculator: &str,
    view: &StageView,
    active: bool,
) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{calculator} - {} ({}){}",
        view.name,
        view.key,
        if active { " [active]" } else { "" }
    );
    let _ = writeln!(
        out,
        "Goal: {}   Current: {}   Include planned: {}",
        or_dash(&view.goal),
        or_dash(&view.current),
        if view.include_planned { "yes" } else { "no" }
    );

    if !view.rows.is_empty() {
        let _ = writeln!(
            out,
            "  {:<LABEL_WIDTH$} {:>9} {:>12} {:>14} {:>20}  ",
            "Item", "Points", "Input", "Earned", "Required"
        );
        for row in &view.rows {
            let _ = writeln!(
                out,
                "  {:<LABEL_WIDTH$} {:>9} {:>12} {:>14} {:>20}  {}",
                label(row),
                group_thousands(row.multiplier),
                row.input,
                group_thousands(row.earned),
                row.required,
                bar(row)
            );
        }
        let _ = writeln!(out, "Total expected: {}", group_thousands(view.total_earned));
    }

    let _ = writeln!(
        out,
        "Expected: {}   Remaining: {}{}",
        group_thousands(view.expected),
        group_thousands(view.remaining),
        if view.goal_achieved { "   Goal reached" } else { "" }
    );
    out
}

pub fn render_overall_total(total: Decimal) -> String {
    format!("Overall total expected: {} pts", group_thousands(total))
}
