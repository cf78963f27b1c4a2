//! Stage totals: earned points, remaining-to-goal and per-item requirements.
//!
//! A stage combines the user's per-item quantities with each item's
//! multiplier into `total_earned`, then measures that against the goal:
//!
//! ```text
//! effective_current = include_planned ? current + total_earned : current
//! remaining         = max(goal - effective_current, 0)
//! ```
//!
//! Goal, current and every quantity are free text run through
//! [`evaluate`](crate::calculations::expression::evaluate), so `5*2+3` is a
//! valid quantity and anything unparseable counts as zero.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use wos_core::calculations::StageAggregator;
//! use wos_core::models::{ItemCategory, LineItem, StageState};
//!
//! let items = vec![
//!     LineItem::new("fc-shards", "Fire Crystal Shards", ItemCategory::None, dec!(2000)),
//!     LineItem::new("speedups", "Speedups (minutes)", ItemCategory::Speedup, dec!(30)),
//! ];
//!
//! let mut stage = StageState::with_goal("100000");
//! stage.current = "10000".to_string();
//! stage.inputs.insert("fc-shards".to_string(), "5*2".to_string());
//!
//! let derived = StageAggregator::new(&items).recompute(&stage);
//!
//! assert_eq!(derived.total_earned, dec!(20000));
//! assert_eq!(derived.remaining, dec!(70000));
//! ```

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::calculations::common::{ceil_div, clamp_to_zero};
use crate::calculations::expression::{evaluate, evaluate_field};
use crate::models::{LineItem, StageDerived, StageState};

/// One line item of a stage with its quantity and points resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRow<'a> {
    pub item: &'a LineItem,
    /// Evaluated quantity; `0` when the input is missing or invalid.
    pub quantity: Decimal,
    /// Effective multiplier after any level override.
    pub multiplier: Decimal,
    pub earned: Decimal,
}

impl StageRow<'_> {
    /// Units of this item still needed to close `remaining`.
    pub fn required(
        &self,
        remaining: Decimal,
    ) -> Decimal {
        required_to_goal(remaining, self.multiplier)
    }
}

/// Aggregates one stage's inputs over its line items.
#[derive(Debug, Clone, Copy)]
pub struct StageAggregator<'a> {
    items: &'a [LineItem],
}

impl<'a> StageAggregator<'a> {
    pub fn new(items: &'a [LineItem]) -> Self {
        Self { items }
    }

    /// Resolves every item of the stage into a [`StageRow`], in catalog order.
    pub fn rows(
        &self,
        stage: &StageState,
    ) -> Vec<StageRow<'a>> {
        self.items
            .iter()
            .map(|item| {
                let quantity = evaluate_field(stage.input(&item.id));
                let multiplier = item.effective_multiplier(stage.level_override(&item.id));
                let earned = quantity.checked_mul(multiplier).unwrap_or_else(|| {
                    warn!(item = %item.id, %quantity, %multiplier, "earned points overflow, counting as zero");
                    Decimal::ZERO
                });
                StageRow {
                    item,
                    quantity,
                    multiplier,
                    earned,
                }
            })
            .collect()
    }

    /// Computes `total_earned` and `remaining` for `stage`.
    ///
    /// Pure: the stage is not modified. Callers store the result in
    /// [`StageState::derived`]. Sums saturate at the `Decimal` range.
    pub fn recompute(
        &self,
        stage: &StageState,
    ) -> StageDerived {
        let total_earned = saturating_total(self.rows(stage).iter().map(|row| row.earned));
        let goal = evaluate(&stage.goal);
        let current = evaluate(&stage.current);

        let progress = effective_current(current, total_earned, stage.include_planned);
        let remaining = clamp_to_zero(goal.saturating_sub(progress));

        debug!(
            %goal,
            %current,
            %total_earned,
            %remaining,
            include_planned = stage.include_planned,
            "stage recomputed"
        );

        StageDerived {
            total_earned,
            remaining,
        }
    }
}

/// Current progress with planned points added when `include_planned` is set.
pub fn effective_current(
    current: Decimal,
    total_earned: Decimal,
    include_planned: bool,
) -> Decimal {
    if include_planned {
        current.saturating_add(total_earned)
    } else {
        current
    }
}

/// Whole units of an item worth `multiplier` points needed to cover
/// `remaining`. Zero when the goal is met or the item is worth nothing.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use wos_core::calculations::required_to_goal;
///
/// assert_eq!(required_to_goal(dec!(200000), dec!(3)), dec!(66667));
/// assert_eq!(required_to_goal(dec!(0), dec!(3)), dec!(0));
/// ```
pub fn required_to_goal(
    remaining: Decimal,
    multiplier: Decimal,
) -> Decimal {
    if remaining <= Decimal::ZERO || multiplier <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    ceil_div(remaining, multiplier).unwrap_or(Decimal::ZERO)
}

/// Whether the stage has reached its goal.
///
/// Planned points only count towards the goal when `include_planned` is set.
pub fn goal_achieved(
    stage: &StageState,
    derived: &StageDerived,
) -> bool {
    let goal = evaluate(&stage.goal);
    let current = evaluate(&stage.current);
    effective_current(current, derived.total_earned, stage.include_planned) >= goal
}

/// The "expected" figure shown under a stage: progress plus plan when
/// planned points are included, the plan alone otherwise.
pub fn expected_points(
    stage: &StageState,
    derived: &StageDerived,
) -> Decimal {
    if stage.include_planned {
        evaluate(&stage.current).saturating_add(derived.total_earned)
    } else {
        derived.total_earned
    }
}

/// Sum of `values`, saturating instead of overflowing.
pub fn saturating_total(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |total, value| total.saturating_add(value))
}

/// Largest `earned` among `rows`, or `0` for an empty stage.
pub fn max_earned(rows: &[StageRow<'_>]) -> Decimal {
    rows.iter()
        .map(|row| row.earned)
        .max()
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{ItemCategory, LevelOption};

    fn sample_items() -> Vec<LineItem> {
        vec![
            LineItem::new("mithril", "Mithril", ItemCategory::None, dec!(216000)),
            LineItem::new("speedups", "Speedups (minutes)", ItemCategory::Speedup, dec!(30)),
            LineItem::new("train-troops", "Train Troops", ItemCategory::Troops, dec!(30)).with_levels(vec![
                LevelOption::new("T9", dec!(22)),
                LevelOption::new("T10", dec!(30)),
                LevelOption::new("T11", dec!(37)),
            ]),
        ]
    }

    fn stage_with(
        goal: &str,
        current: &str,
        inputs: &[(&str, &str)],
    ) -> StageState {
        let mut stage = StageState::with_goal(goal);
        stage.current = current.to_string();
        for (id, value) in inputs {
            stage.inputs.insert(id.to_string(), value.to_string());
        }
        stage
    }

    // =========================================================================
    // recompute tests
    // =========================================================================

    #[test]
    fn recompute_sums_quantity_times_multiplier() {
        let items = sample_items();
        let stage = stage_with("1000000", "", &[("mithril", "2"), ("speedups", "60*2")]);

        let derived = StageAggregator::new(&items).recompute(&stage);

        assert_eq!(derived.total_earned, dec!(435600));
        assert_eq!(derived.remaining, dec!(564400));
    }

    #[test]
    fn recompute_includes_current_when_planned() {
        let items = sample_items();
        let stage = stage_with("1000", "400", &[("speedups", "10")]);

        let derived = StageAggregator::new(&items).recompute(&stage);

        assert_eq!(derived.remaining, dec!(300));
    }

    #[test]
    fn recompute_ignores_plan_when_not_included() {
        let items = sample_items();
        let mut stage = stage_with("1000", "400", &[("speedups", "10")]);
        stage.include_planned = false;

        let derived = StageAggregator::new(&items).recompute(&stage);

        assert_eq!(derived.total_earned, dec!(300));
        assert_eq!(derived.remaining, dec!(600));
    }

    #[test]
    fn recompute_clamps_remaining_at_zero() {
        let items = sample_items();
        let stage = stage_with("100", "50", &[("mithril", "1")]);

        let derived = StageAggregator::new(&items).recompute(&stage);

        assert_eq!(derived.remaining, Decimal::ZERO);
    }

    #[test]
    fn recompute_treats_invalid_inputs_as_zero() {
        let items = sample_items();
        let stage = stage_with("abc", "1/0", &[("mithril", "2x"), ("speedups", "")]);

        let derived = StageAggregator::new(&items).recompute(&stage);

        assert_eq!(derived, StageDerived::default());
    }

    #[test]
    fn recompute_applies_level_override() {
        let items = sample_items();
        let mut stage = stage_with("0", "", &[("train-troops", "100")]);
        stage.level_overrides.insert("train-troops".to_string(), dec!(37));

        let derived = StageAggregator::new(&items).recompute(&stage);

        assert_eq!(derived.total_earned, dec!(3700));
    }

    #[test]
    fn recompute_ignores_override_on_item_without_levels() {
        let items = sample_items();
        let mut stage = stage_with("0", "", &[("mithril", "1")]);
        stage.level_overrides.insert("mithril".to_string(), dec!(1));

        let derived = StageAggregator::new(&items).recompute(&stage);

        assert_eq!(derived.total_earned, dec!(216000));
    }

    #[test]
    fn recompute_is_independent_of_item_order() {
        let items = sample_items();
        let mut reversed = items.clone();
        reversed.reverse();
        let stage = stage_with("500000", "7", &[("mithril", "1"), ("speedups", "3"), ("train-troops", "9")]);

        assert_eq!(
            StageAggregator::new(&items).recompute(&stage),
            StageAggregator::new(&reversed).recompute(&stage)
        );
    }

    #[test]
    fn recompute_of_empty_stage_is_goal() {
        let stage = stage_with("270000", "", &[]);

        let derived = StageAggregator::new(&[]).recompute(&stage);

        assert_eq!(derived.total_earned, Decimal::ZERO);
        assert_eq!(derived.remaining, dec!(270000));
    }

    #[test]
    fn recompute_counts_overflowing_row_as_zero() {
        let items = sample_items();
        let stage = stage_with(
            "1000",
            "",
            &[("mithril", "9999999999999999999999999999"), ("speedups", "10")],
        );

        let rows = StageAggregator::new(&items).rows(&stage);
        let derived = StageAggregator::new(&items).recompute(&stage);

        assert_eq!(rows[0].earned, Decimal::ZERO);
        assert_eq!(derived.total_earned, dec!(300));
        assert_eq!(derived.remaining, dec!(700));
    }

    #[test]
    fn recompute_saturates_remaining_at_decimal_range() {
        let stage = stage_with("79228162514264337593543950335", "-1", &[]);

        let derived = StageAggregator::new(&[]).recompute(&stage);

        assert_eq!(derived.remaining, Decimal::MAX);
        assert!(!goal_achieved(&stage, &derived));
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let items = vec![
            LineItem::new("a", "A", ItemCategory::None, dec!(30)),
            LineItem::new("b", "B", ItemCategory::None, dec!(30)),
        ];
        let stage = stage_with(
            "0",
            "79228162514264337593543950335",
            &[("a", "2000000000000000000000000000"), ("b", "2000000000000000000000000000")],
        );

        let derived = StageAggregator::new(&items).recompute(&stage);

        assert_eq!(derived.total_earned, Decimal::MAX);
        assert_eq!(derived.remaining, Decimal::ZERO);
        assert_eq!(expected_points(&stage, &derived), Decimal::MAX);
    }

    // =========================================================================
    // row / requirement tests
    // =========================================================================

    #[test]
    fn rows_follow_catalog_order() {
        let items = sample_items();
        let stage = stage_with("0", "", &[("speedups", "2")]);

        let rows = StageAggregator::new(&items).rows(&stage);
        let ids: Vec<&str> = rows.iter().map(|r| r.item.id.as_str()).collect();

        assert_eq!(ids, vec!["mithril", "speedups", "train-troops"]);
        assert_eq!(rows[1].quantity, dec!(2));
        assert_eq!(rows[1].earned, dec!(60));
    }

    #[test]
    fn required_to_goal_rounds_up() {
        assert_eq!(required_to_goal(dec!(100), dec!(30)), dec!(4));
    }

    #[test]
    fn required_to_goal_is_zero_for_worthless_items() {
        assert_eq!(required_to_goal(dec!(100), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(required_to_goal(dec!(100), dec!(-5)), Decimal::ZERO);
    }

    #[test]
    fn row_required_uses_effective_multiplier() {
        let items = sample_items();
        let mut stage = stage_with("0", "", &[]);
        stage.level_overrides.insert("train-troops".to_string(), dec!(22));

        let rows = StageAggregator::new(&items).rows(&stage);

        assert_eq!(rows[2].required(dec!(100)), dec!(5));
    }

    #[test]
    fn max_earned_of_no_rows_is_zero() {
        assert_eq!(max_earned(&[]), Decimal::ZERO);
    }

    // =========================================================================
    // goal / expected tests
    // =========================================================================

    #[test]
    fn goal_achieved_counts_plan_only_when_included() {
        let items = sample_items();
        let mut stage = stage_with("100", "50", &[("speedups", "2")]);
        let derived = StageAggregator::new(&items).recompute(&stage);

        assert!(goal_achieved(&stage, &derived));

        stage.include_planned = false;
        assert!(!goal_achieved(&stage, &derived));
    }

    #[test]
    fn expected_points_follow_include_planned() {
        let items = sample_items();
        let mut stage = stage_with("100", "50", &[("speedups", "2")]);
        let derived = StageAggregator::new(&items).recompute(&stage);

        assert_eq!(expected_points(&stage, &derived), dec!(110));

        stage.include_planned = false;
        assert_eq!(expected_points(&stage, &derived), dec!(60));
    }
}
