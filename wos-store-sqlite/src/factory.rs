use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use wos_core::store::{KeyValueStore, StoreConfig, StoreError, StoreFactory};

use crate::repository::SqliteStore;

/// Maps a connection string to a sqlx SQLite URL.
///
/// Bare paths become `sqlite:<path>?mode=rwc` so the file is created when
/// missing; values already starting with `sqlite:` pass through.
pub fn database_url(connection_string: &str) -> String {
    if connection_string.starts_with("sqlite:") {
        connection_string.to_string()
    } else {
        format!("sqlite:{connection_string}?mode=rwc")
    }
}

/// [`StoreFactory`] for SQLite.
///
/// Register this with a [`wos_core::store::StoreRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use wos_core::store::StoreRegistry;
/// use wos_store_sqlite::SqliteStoreFactory;
///
/// let mut registry = StoreRegistry::with_memory();
/// registry.register(Box::new(SqliteStoreFactory));
/// ```
pub struct SqliteStoreFactory;

impl SqliteStoreFactory {
    pub const BACKEND: &'static str = "sqlite";
}

#[async_trait]
impl StoreFactory for SqliteStoreFactory {
    fn backend_name(&self) -> &'static str {
        Self::BACKEND
    }

    /// Open the database described by `config.connection_string`.
    ///
    /// Accepted connection-string values:
    /// * A bare file path, e.g. `"wos.db"`. The file is created if it does
    ///   not exist.
    /// * `":memory:"` (or empty), an ephemeral in-memory database.
    /// * A full sqlx URL such as `"sqlite:wos.db?mode=rwc"`.
    async fn create(&self, config: &StoreConfig) -> Result<Arc<dyn KeyValueStore>, StoreError> {
        let connection_string = config.connection_string.trim();
        let store = if connection_string.is_empty() || connection_string == ":memory:" {
            SqliteStore::in_memory().await
        } else {
            SqliteStore::new(&database_url(connection_string)).await
        }
        .map_err(|e| StoreError::Unavailable(format!("{e:#}")))?;

        store
            .run_migrations()
            .await
            .map_err(|e| StoreError::Backend(format!("{e:#}")))?;

        info!(connection = %connection_string, "sqlite store ready");
        Ok(Arc::new(store))
    }
}
