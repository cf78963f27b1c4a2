mod factory;
mod repository;

pub use factory::{SqliteStoreFactory, database_url};
pub use repository::SqliteStore;
