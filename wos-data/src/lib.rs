mod builtin;
mod loader;

pub use builtin::{BUILTIN_GOALS_CSV, BUILTIN_ITEMS_CSV, builtin_catalog};
pub use loader::{CatalogLoader, CatalogLoaderError, GoalRecord, ItemRecord, parse_levels};
