//! Calculator logic for the Whiteout Survival planners.
//!
//! - [`expression`]: the safe arithmetic evaluator behind every numeric field
//! - [`stage`]: per-stage point totals and remaining-to-goal
//! - [`healing`]: healing batch and cycle planning

pub mod common;
pub mod expression;
pub mod healing;
pub mod stage;

pub use expression::{ExpressionError, evaluate, try_evaluate};
pub use healing::{HealingError, HealingInput, HealingResult, SECONDS_PER_HEAL_CYCLE, calculate_healing};
pub use stage::{
    StageAggregator, StageRow, effective_current, expected_points, goal_achieved, max_earned,
    required_to_goal, saturating_total,
};
