use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Values derived from a [`StageState`] by the stage aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageDerived {
    pub total_earned: Decimal,
    pub remaining: Decimal,
}

/// Everything the user has entered for one stage of a calculator.
///
/// Text fields hold exactly what was typed (minus thousands separators) and
/// are evaluated on demand, so an in-progress expression like `5*` survives
/// a reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredStage", into = "StoredStage")]
pub struct StageState {
    pub goal: String,
    pub current: String,
    /// Raw quantity text keyed by line item id.
    pub inputs: BTreeMap<String, String>,
    /// Selected level multiplier keyed by line item id.
    pub level_overrides: BTreeMap<String, Decimal>,
    pub include_planned: bool,
    pub derived: StageDerived,
}

impl StageState {
    /// A fresh stage with the given goal and planned spending included.
    ///
    /// `derived` starts zeroed; run the stage aggregator before reading it.
    pub fn with_goal(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            current: String::new(),
            inputs: BTreeMap::new(),
            level_overrides: BTreeMap::new(),
            include_planned: true,
            derived: StageDerived::default(),
        }
    }

    pub fn input(
        &self,
        item_id: &str,
    ) -> Option<&str> {
        self.inputs.get(item_id).map(String::as_str)
    }

    pub fn level_override(
        &self,
        item_id: &str,
    ) -> Option<Decimal> {
        self.level_overrides.get(item_id).copied()
    }
}

impl Default for StageState {
    fn default() -> Self {
        Self::with_goal("")
    }
}

/// On-disk layout of a stage.
///
/// Field names follow the browser storage format. Older blobs keep level
/// choices in separate `troopLevels` / `beastLevels` maps; both are merged
/// into `levelOverrides` on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredStage {
    goal: String,
    current: String,
    remaining: Decimal,
    total_earned: Decimal,
    inputs: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    level_overrides: BTreeMap<String, Decimal>,
    #[serde(skip_serializing)]
    troop_levels: BTreeMap<String, Decimal>,
    #[serde(skip_serializing)]
    beast_levels: BTreeMap<String, Decimal>,
    include_planned: bool,
}

impl Default for StoredStage {
    fn default() -> Self {
        Self {
            goal: String::new(),
            current: String::new(),
            remaining: Decimal::ZERO,
            total_earned: Decimal::ZERO,
            inputs: BTreeMap::new(),
            level_overrides: BTreeMap::new(),
            troop_levels: BTreeMap::new(),
            beast_levels: BTreeMap::new(),
            include_planned: true,
        }
    }
}

impl From<StoredStage> for StageState {
    fn from(stored: StoredStage) -> Self {
        let mut level_overrides = stored.troop_levels;
        level_overrides.extend(stored.beast_levels);
        level_overrides.extend(stored.level_overrides);

        Self {
            goal: stored.goal,
            current: stored.current,
            inputs: stored.inputs,
            level_overrides,
            include_planned: stored.include_planned,
            derived: StageDerived {
                total_earned: stored.total_earned,
                remaining: stored.remaining,
            },
        }
    }
}

impl From<StageState> for StoredStage {
    fn from(state: StageState) -> Self {
        Self {
            goal: state.goal,
            current: state.current,
            remaining: state.derived.remaining,
            total_earned: state.derived.total_earned,
            inputs: state.inputs,
            level_overrides: state.level_overrides,
            troop_levels: BTreeMap::new(),
            beast_levels: BTreeMap::new(),
            include_planned: state.include_planned,
        }
    }
}
