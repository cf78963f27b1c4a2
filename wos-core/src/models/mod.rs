mod calculator;
mod catalog;
mod line_item;
mod stage_state;

pub use calculator::{CalculatorKind, CalculatorState};
pub use catalog::{Catalog, CalculatorDefinition, StageDefinition, stage_ordinal};
pub use line_item::{ItemCategory, LevelOption, LineItem};
pub use stage_state::{StageDerived, StageState};
