pub mod autosave;
pub mod factory;
pub mod memory;
pub mod persistence;
pub mod repository;

pub use autosave::{Autosaver, DEFAULT_AUTOSAVE_DELAY};
pub use factory::{MemoryStoreFactory, StoreConfig, StoreFactory, StoreRegistry};
pub use memory::MemoryStore;
pub use repository::{KeyValueStore, StoreError};
