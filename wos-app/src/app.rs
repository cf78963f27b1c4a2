//! Wiring between configuration, storage backends and catalogs.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};
use wos_core::models::Catalog;
use wos_core::store::{KeyValueStore, StoreConfig, StoreRegistry};
use wos_data::{CatalogLoader, builtin_catalog};
use wos_store_sqlite::SqliteStoreFactory;

use crate::config::CatalogConfig;

/// Registry with every storage backend this application ships.
pub fn build_registry() -> StoreRegistry {
    let mut registry = StoreRegistry::with_memory();
    registry.register(Box::new(SqliteStoreFactory));
    registry
}

/// Opens the store described by `config`.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn KeyValueStore>> {
    debug!(backend = %config.backend, "opening store");
    build_registry()
        .create(config)
        .await
        .with_context(|| format!("Failed to open {} store", config.backend))
}

/// The built-in catalog with any configured catalog files layered on top.
///
/// Calculators defined in the files replace the built-in ones entirely.
pub fn load_catalog(config: &CatalogConfig) -> Result<Catalog> {
    let mut catalog = builtin_catalog().context("Built-in catalog is invalid")?;

    if let Some(items) = &config.items {
        let overlay = CatalogLoader::load_files(items, config.goals.as_deref())
            .with_context(|| format!("Failed to load catalog: {}", items.display()))?;
        info!(
            path = %items.display(),
            calculators = overlay.kinds().count(),
            "custom catalog loaded"
        );
        catalog.merge(overlay);
    }

    Ok(catalog)
}
