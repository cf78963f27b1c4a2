use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::StageState;

/// The calculators offered by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalculatorKind {
    Armament,
    OfficerProject,
    AllianceShowdown,
    KingOfIcefield,
    StateOfPower,
    Healing,
}

impl CalculatorKind {
    pub const ALL: [CalculatorKind; 6] = [
        Self::Armament,
        Self::OfficerProject,
        Self::AllianceShowdown,
        Self::KingOfIcefield,
        Self::StateOfPower,
        Self::Healing,
    ];

    /// Short code used in catalogs and on the command line.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Armament => "armament",
            Self::OfficerProject => "officer-project",
            Self::AllianceShowdown => "alliance-showdown",
            Self::KingOfIcefield => "king-of-icefield",
            Self::StateOfPower => "state-of-power",
            Self::Healing => "healing",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == s.trim())
    }

    /// Fixed key under which this calculator's state is persisted.
    pub fn storage_key(&self) -> &'static str {
        match self {
            Self::Armament => "wos-armament-calculator",
            Self::OfficerProject => "wos-officer-calculator",
            Self::AllianceShowdown => "wos-alliance-calculator",
            Self::KingOfIcefield => "wos-king-of-icefield-calculator",
            Self::StateOfPower => "wos-state-of-power-calculator",
            Self::Healing => "wos-healing-calculator",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Armament => "Armament Competition",
            Self::OfficerProject => "Officer Project",
            Self::AllianceShowdown => "Alliance Showdown",
            Self::KingOfIcefield => "King of Icefield",
            Self::StateOfPower => "State of Power",
            Self::Healing => "Healing Calculator",
        }
    }

    /// Whether the calculator is organised into point stages.
    pub fn is_staged(&self) -> bool {
        !matches!(self, Self::Healing)
    }
}

/// Persisted state of a staged calculator.
///
/// Serialized as `{ "stages": { "stage1": {...} }, "activeTab": "stage1" }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalculatorState {
    #[serde(default)]
    pub stages: BTreeMap<String, StageState>,
    #[serde(
        rename = "activeTab",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub active_tab: Option<String>,
}

impl CalculatorState {
    pub fn stage(
        &self,
        key: &str,
    ) -> Option<&StageState> {
        self.stages.get(key)
    }

    pub fn stage_mut(
        &mut self,
        key: &str,
    ) -> Option<&mut StageState> {
        self.stages.get_mut(key)
    }
}
