//! Plain-text rendering of calculator views for the terminal.
//!
//! - `stage_table` - one stage's line items, totals and goal status
//! - `healing_report` - the healing calculator's form and result

mod healing_report;
mod stage_table;

pub use healing_report::{render_healing_error, render_healing_result};
pub use stage_table::{render_overall_total, render_stage};
