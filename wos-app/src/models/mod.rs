mod healing_form;

pub use healing_form::{HealingForm, healing_autosaver};
