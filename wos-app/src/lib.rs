pub mod app;
pub mod config;
pub mod logging;
pub mod models;
pub mod state;
pub mod utils;
pub mod views;

pub use config::AppConfig;
pub use models::HealingForm;
pub use state::{CalculatorSession, SessionError, StageView};
