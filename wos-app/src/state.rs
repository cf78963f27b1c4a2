//! View-model for the staged calculators.
//!
//! A [`CalculatorSession`] owns one calculator's state, applies edits, keeps
//! every stage's derived totals current and schedules a debounced save after
//! each change. Edits spawn the save task, so they must run inside a tokio
//! runtime.

use std::{sync::Arc, time::Duration};

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};
use wos_core::calculations::{StageAggregator, expected_points, goal_achieved, max_earned, saturating_total};
use wos_core::format::{Highlight, background_style, format_required};
use wos_core::models::{
    CalculatorDefinition, CalculatorKind, CalculatorState, Catalog, ItemCategory, LineItem,
    StageDefinition, StageState,
};
use wos_core::store::persistence::{clear_calculator_data, load_calculator_data};
use wos_core::store::{Autosaver, KeyValueStore};

use crate::utils::strip_commas;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("{0} is not a staged calculator")]
    NotStaged(&'static str),

    #[error("no catalog entry for {0}")]
    UnknownCalculator(&'static str),

    #[error("unknown stage '{0}'")]
    UnknownStage(String),

    #[error("stage '{stage}' has no item '{item}'")]
    UnknownItem { stage: String, item: String },

    #[error("item '{0}' has no selectable levels")]
    NoLevels(String),

    #[error("item '{item}' has no level worth {multiplier}")]
    UnknownLevel { item: String, multiplier: Decimal },
}

/// One line item as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub item_id: String,
    pub label: String,
    pub category: ItemCategory,
    pub multiplier: Decimal,
    /// Name of the selected level, if the item has levels and one is chosen.
    pub level: Option<String>,
    pub input: String,
    pub earned: Decimal,
    /// Units still needed to close the gap, already formatted.
    pub required: String,
    pub highlight: Option<Highlight>,
}

/// One stage as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageView {
    pub key: String,
    pub name: String,
    pub goal: String,
    pub current: String,
    pub include_planned: bool,
    pub rows: Vec<RowView>,
    pub total_earned: Decimal,
    pub expected: Decimal,
    pub remaining: Decimal,
    pub goal_achieved: bool,
}

pub struct CalculatorSession {
    definition: CalculatorDefinition,
    state: CalculatorState,
    autosaver: Autosaver,
}

impl CalculatorSession {
    /// Loads the saved state of `kind`, or the catalog defaults.
    ///
    /// Saved stages the catalog no longer has are dropped and missing ones
    /// get their defaults. Every stage is recomputed before returning.
    pub async fn open(
        kind: CalculatorKind,
        catalog: &Catalog,
        store: Arc<dyn KeyValueStore>,
        delay: Duration,
    ) -> Result<Self, SessionError> {
        if !kind.is_staged() {
            return Err(SessionError::NotStaged(kind.display_name()));
        }
        let definition = catalog
            .get(kind)
            .cloned()
            .ok_or(SessionError::UnknownCalculator(kind.display_name()))?;

        let saved = load_calculator_data(store.as_ref(), kind).await;
        let restored = saved.is_some();
        let state = reconcile(&definition, saved);

        let mut session = Self {
            definition,
            state,
            autosaver: Autosaver::for_calculator(store, kind, delay),
        };
        session.recompute_all();

        info!(calculator = kind.code(), restored, "calculator opened");
        Ok(session)
    }

    pub fn kind(&self) -> CalculatorKind {
        self.definition.kind
    }

    pub fn definition(&self) -> &CalculatorDefinition {
        &self.definition
    }

    pub fn state(&self) -> &CalculatorState {
        &self.state
    }

    pub fn active_tab(&self) -> Option<&str> {
        self.state.active_tab.as_deref()
    }

    pub fn set_goal(
        &mut self,
        stage: &str,
        value: &str,
    ) -> Result<(), SessionError> {
        self.edit(stage, |_, state| {
            state.goal = strip_commas(value);
            Ok(())
        })
    }

    pub fn set_current(
        &mut self,
        stage: &str,
        value: &str,
    ) -> Result<(), SessionError> {
        self.edit(stage, |_, state| {
            state.current = strip_commas(value);
            Ok(())
        })
    }

    /// Stores the quantity text for one item, commas removed.
    pub fn set_item_input(
        &mut self,
        stage: &str,
        item_id: &str,
        value: &str,
    ) -> Result<(), SessionError> {
        self.edit(stage, |definition, state| {
            require_item(definition, item_id)?;
            state.inputs.insert(item_id.to_string(), strip_commas(value));
            Ok(())
        })
    }

    /// Picks a level for an item that offers them; `None` clears the choice.
    pub fn select_level(
        &mut self,
        stage: &str,
        item_id: &str,
        multiplier: Option<Decimal>,
    ) -> Result<(), SessionError> {
        self.edit(stage, |definition, state| {
            let item = require_item(definition, item_id)?;
            if !item.has_levels() {
                return Err(SessionError::NoLevels(item_id.to_string()));
            }
            match multiplier {
                Some(multiplier) => {
                    if item.level_for(multiplier).is_none() {
                        return Err(SessionError::UnknownLevel {
                            item: item_id.to_string(),
                            multiplier,
                        });
                    }
                    state.level_overrides.insert(item_id.to_string(), multiplier);
                }
                None => {
                    state.level_overrides.remove(item_id);
                }
            }
            Ok(())
        })
    }

    /// Flips whether planned points count towards the goal; returns the new
    /// setting.
    pub fn toggle_include_planned(
        &mut self,
        stage: &str,
    ) -> Result<bool, SessionError> {
        let mut include_planned = false;
        self.edit(stage, |_, state| {
            state.include_planned = !state.include_planned;
            include_planned = state.include_planned;
            Ok(())
        })?;
        Ok(include_planned)
    }

    /// Restores the stage's default goal and clears everything entered,
    /// keeping the include-planned setting.
    pub fn reset_stage(
        &mut self,
        stage: &str,
    ) -> Result<(), SessionError> {
        self.edit(stage, |definition, state| {
            let include_planned = state.include_planned;
            *state = definition.default_state();
            state.include_planned = include_planned;
            Ok(())
        })
    }

    pub fn set_active_tab(
        &mut self,
        stage: &str,
    ) -> Result<(), SessionError> {
        if self.definition.stage(stage).is_none() {
            return Err(SessionError::UnknownStage(stage.to_string()));
        }
        self.state.active_tab = Some(stage.to_string());
        self.autosaver.schedule(&self.state);
        Ok(())
    }

    /// Drops any pending save, removes the stored blob and returns every
    /// stage to its defaults.
    pub async fn reset_all(&mut self) {
        self.autosaver.cancel();
        clear_calculator_data(self.autosaver.store().as_ref(), self.kind()).await;
        self.state = self.definition.default_state();
        self.recompute_all();
        info!(calculator = self.kind().code(), "calculator reset");
    }

    /// Writes any pending change now.
    pub async fn flush(&mut self) {
        self.autosaver.flush().await;
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.autosaver.has_pending()
    }

    pub fn stage_view(
        &self,
        key: &str,
    ) -> Option<StageView> {
        let definition = self.definition.stage(key)?;
        let state = self.state.stage(key)?;
        let derived = state.derived;

        let rows = StageAggregator::new(&definition.items).rows(state);
        let max = max_earned(&rows);

        let rows = rows
            .iter()
            .map(|row| RowView {
                item_id: row.item.id.clone(),
                label: row.item.label.clone(),
                category: row.item.category,
                multiplier: row.multiplier,
                level: state
                    .level_override(&row.item.id)
                    .and_then(|multiplier| row.item.level_for(multiplier))
                    .map(|level| level.name.clone()),
                input: state.input(&row.item.id).unwrap_or_default().to_string(),
                earned: row.earned,
                required: format_required(row.item.category, row.required(derived.remaining)),
                highlight: background_style(row.earned, max),
            })
            .collect();

        Some(StageView {
            key: definition.key.clone(),
            name: definition.name.clone(),
            goal: state.goal.clone(),
            current: state.current.clone(),
            include_planned: state.include_planned,
            rows,
            total_earned: derived.total_earned,
            expected: expected_points(state, &derived),
            remaining: derived.remaining,
            goal_achieved: goal_achieved(state, &derived),
        })
    }

    /// Planned points across every stage.
    pub fn overall_total(&self) -> Decimal {
        saturating_total(self.state.stages.values().map(|stage| stage.derived.total_earned))
    }

    fn edit<F>(
        &mut self,
        key: &str,
        apply: F,
    ) -> Result<(), SessionError>
    where
        F: FnOnce(&StageDefinition, &mut StageState) -> Result<(), SessionError>,
    {
        let definition = self
            .definition
            .stage(key)
            .ok_or_else(|| SessionError::UnknownStage(key.to_string()))?;
        let state = self
            .state
            .stages
            .entry(key.to_string())
            .or_insert_with(|| definition.default_state());

        apply(definition, state)?;
        state.derived = StageAggregator::new(&definition.items).recompute(state);
        debug!(
            calculator = self.definition.kind.code(),
            stage = key,
            remaining = %state.derived.remaining,
            "stage edited"
        );

        self.autosaver.schedule(&self.state);
        Ok(())
    }

    fn recompute_all(&mut self) {
        for definition in &self.definition.stages {
            if let Some(state) = self.state.stages.get_mut(&definition.key) {
                state.derived = StageAggregator::new(&definition.items).recompute(state);
            }
        }
    }
}

fn require_item<'a>(
    definition: &'a StageDefinition,
    item_id: &str,
) -> Result<&'a LineItem, SessionError> {
    definition
        .item(item_id)
        .ok_or_else(|| SessionError::UnknownItem {
            stage: definition.key.clone(),
            item: item_id.to_string(),
        })
}

/// Lines saved state up with the catalog's stages.
fn reconcile(
    definition: &CalculatorDefinition,
    saved: Option<CalculatorState>,
) -> CalculatorState {
    let Some(mut saved) = saved else {
        return definition.default_state();
    };

    let stages = definition
        .stages
        .iter()
        .map(|stage| {
            let state = saved
                .stages
                .remove(&stage.key)
                .unwrap_or_else(|| stage.default_state());
            (stage.key.clone(), state)
        })
        .collect();

    let active_tab = saved
        .active_tab
        .filter(|key| definition.stage(key).is_some())
        .or_else(|| definition.stages.first().map(|stage| stage.key.clone()));

    CalculatorState { stages, active_tab }
}
