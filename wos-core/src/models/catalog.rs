use std::collections::BTreeMap;

use super::{CalculatorKind, CalculatorState, LineItem, StageState};

/// Static description of one stage: its items and default goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageDefinition {
    /// Storage key, `stage1` .. `stageN`.
    pub key: String,
    pub name: String,
    pub default_goal: String,
    pub items: Vec<LineItem>,
}

impl StageDefinition {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        default_goal: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            default_goal: default_goal.into(),
            items: Vec::new(),
        }
    }

    pub fn with_items(
        mut self,
        items: Vec<LineItem>,
    ) -> Self {
        self.items = items;
        self
    }

    pub fn item(
        &self,
        id: &str,
    ) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn default_state(&self) -> StageState {
        StageState::with_goal(self.default_goal.clone())
    }

    /// Numeric position parsed from the key (`stage3` → 3).
    pub fn ordinal(&self) -> Option<u32> {
        stage_ordinal(&self.key)
    }
}

/// Parses the number out of a `stageN` key.
pub fn stage_ordinal(key: &str) -> Option<u32> {
    key.strip_prefix("stage")
        .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|n| n.parse().ok())
        .filter(|n| *n > 0)
}

/// All stages of one calculator, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculatorDefinition {
    pub kind: CalculatorKind,
    pub stages: Vec<StageDefinition>,
}

impl CalculatorDefinition {
    pub fn new(kind: CalculatorKind) -> Self {
        Self {
            kind,
            stages: Vec::new(),
        }
    }

    pub fn stage(
        &self,
        key: &str,
    ) -> Option<&StageDefinition> {
        self.stages.iter().find(|stage| stage.key == key)
    }

    pub fn stage_keys(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|stage| stage.key.as_str())
    }

    /// State used when nothing has been saved yet.
    pub fn default_state(&self) -> CalculatorState {
        CalculatorState {
            stages: self
                .stages
                .iter()
                .map(|stage| (stage.key.clone(), stage.default_state()))
                .collect(),
            active_tab: self.stages.first().map(|stage| stage.key.clone()),
        }
    }

    /// Keeps stages sorted by their numeric ordinal.
    pub fn sort_stages(&mut self) {
        self.stages
            .sort_by_key(|stage| stage.ordinal().unwrap_or(u32::MAX));
    }
}

/// Every calculator definition known to the application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    calculators: BTreeMap<CalculatorKind, CalculatorDefinition>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the definition for `definition.kind`.
    pub fn insert(
        &mut self,
        definition: CalculatorDefinition,
    ) {
        self.calculators.insert(definition.kind, definition);
    }

    pub fn get(
        &self,
        kind: CalculatorKind,
    ) -> Option<&CalculatorDefinition> {
        self.calculators.get(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = CalculatorKind> + '_ {
        self.calculators.keys().copied()
    }

    /// Overlays `other` on top of `self`; calculators present in `other`
    /// replace ours wholesale.
    pub fn merge(
        &mut self,
        other: Catalog,
    ) {
        self.calculators.extend(other.calculators);
    }
}
