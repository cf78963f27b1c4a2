use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Activity category of a [`LineItem`].
///
/// The category decides how a line item is rendered (speedups show their
/// required quantity as a duration) and which items expose a level picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Chief,
    Speedup,
    Troops,
    Beast,
    #[default]
    None,
}

impl ItemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chief => "chief",
            Self::Speedup => "speedup",
            Self::Troops => "troops",
            Self::Beast => "beast",
            Self::None => "none",
        }
    }

    /// Parses a category code. An empty string is the uncategorised item.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "chief" => Some(Self::Chief),
            "speedup" => Some(Self::Speedup),
            "troops" => Some(Self::Troops),
            "beast" => Some(Self::Beast),
            "" | "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// One selectable level of a line item (e.g. a troop tier) and its points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelOption {
    pub name: String,
    pub multiplier: Decimal,
}

impl LevelOption {
    pub fn new(
        name: impl Into<String>,
        multiplier: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            multiplier,
        }
    }
}

/// A single in-game activity worth `base_multiplier` points per unit.
///
/// Line items are static catalog data; they are never created or destroyed
/// while a calculator is in use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Unique within its stage.
    pub id: String,
    pub label: String,
    pub category: ItemCategory,
    pub base_multiplier: Decimal,
    /// Ordered level choices; empty when the multiplier is fixed.
    pub levels: Vec<LevelOption>,
    /// Topic of the help text attached to this item, if any.
    pub help_topic: Option<String>,
}

impl LineItem {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        category: ItemCategory,
        base_multiplier: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            category,
            base_multiplier,
            levels: Vec::new(),
            help_topic: None,
        }
    }

    pub fn with_levels(
        mut self,
        levels: Vec<LevelOption>,
    ) -> Self {
        self.levels = levels;
        self
    }

    pub fn with_help_topic(
        mut self,
        topic: impl Into<String>,
    ) -> Self {
        self.help_topic = Some(topic.into());
        self
    }

    pub fn has_levels(&self) -> bool {
        !self.levels.is_empty()
    }

    /// Resolves the multiplier actually applied to this item's quantity.
    ///
    /// A level override only applies to items that offer levels, and a zero
    /// override counts as "nothing selected".
    pub fn effective_multiplier(
        &self,
        level_override: Option<Decimal>,
    ) -> Decimal {
        match level_override {
            Some(multiplier) if self.has_levels() && !multiplier.is_zero() => multiplier,
            _ => self.base_multiplier,
        }
    }

    /// Finds the level whose multiplier equals `multiplier`.
    pub fn level_for(
        &self,
        multiplier: Decimal,
    ) -> Option<&LevelOption> {
        self.levels.iter().find(|level| level.multiplier == multiplier)
    }
}
