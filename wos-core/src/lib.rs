pub mod calculations;
pub mod format;
pub mod models;
pub mod store;

pub use calculations::{HealingError, evaluate};
pub use models::*;
pub use store::{KeyValueStore, StoreError};
