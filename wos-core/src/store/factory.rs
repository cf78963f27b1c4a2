use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::memory::MemoryStore;
use super::repository::{KeyValueStore, StoreError};

/// Backend-agnostic store configuration.
///
/// `backend` must match the [`StoreFactory::backend_name`] of a registered
/// factory. `connection_string` is passed through to that factory unchanged;
/// its meaning is entirely backend-specific.
///
/// | backend    | connection_string examples          |
/// |------------|-------------------------------------|
/// | `memory`   | ignored                             |
/// | `sqlite`   | `wos.db`, `:memory:`                |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"sqlite"`).
    pub backend: String,
    /// Opaque value forwarded to the factory's `create` method.
    pub connection_string: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: MemoryStoreFactory::BACKEND.to_string(),
            connection_string: String::new(),
        }
    }
}

/// One implementation per storage backend. Each backend crate exports a
/// unit struct implementing this trait, registered with a [`StoreRegistry`]
/// at startup.
#[async_trait]
pub trait StoreFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Open (or create) the backing storage and return a ready store.
    /// Implementations may run migrations here.
    async fn create(&self, config: &StoreConfig) -> Result<Arc<dyn KeyValueStore>, StoreError>;
}

/// Registry of [`StoreFactory`] instances, keyed by backend name.
pub struct StoreRegistry {
    factories: HashMap<&'static str, Box<dyn StoreFactory>>,
}

impl StoreRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry that already knows the in-memory backend.
    pub fn with_memory() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(MemoryStoreFactory));
        registry
    }

    /// Register a backend factory, replacing any factory with the same name.
    pub fn register(&mut self, factory: Box<dyn StoreFactory>) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatch to the factory matching `config.backend`.
    ///
    /// # Errors
    /// * [`StoreError::Configuration`] when no factory is registered for the
    ///   requested backend name.
    /// * Any error the chosen factory itself returns.
    pub async fn create(&self, config: &StoreConfig) -> Result<Arc<dyn KeyValueStore>, StoreError> {
        let factory = self.factories.get(config.backend.as_str()).ok_or_else(|| {
            StoreError::Configuration(format!(
                "unknown backend '{}'; available: {:?}",
                config.backend,
                self.available_backends()
            ))
        })?;

        factory.create(config).await
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Factory for [`MemoryStore`]. Every `create` call returns a fresh, empty
/// store.
pub struct MemoryStoreFactory;

impl MemoryStoreFactory {
    pub const BACKEND: &'static str = "memory";
}

#[async_trait]
impl StoreFactory for MemoryStoreFactory {
    fn backend_name(&self) -> &'static str {
        Self::BACKEND
    }

    async fn create(&self, _config: &StoreConfig) -> Result<Arc<dyn KeyValueStore>, StoreError> {
        Ok(Arc::new(MemoryStore::new()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// tests
// ─────────────────────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;

    // ── stub factory ─────────────────────────────────────────────────────
    /// Flips an `AtomicBool` and hands out a [`MemoryStore`], so tests can
    /// prove `create` was reached.
    struct StubFactory {
        name: &'static str,
        called: Arc<AtomicBool>,
    }

    #[async_trait]
    impl StoreFactory for StubFactory {
        fn backend_name(&self) -> &'static str {
            self.name
        }
        async fn create(&self, _config: &StoreConfig) -> Result<Arc<dyn KeyValueStore>, StoreError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(Arc::new(MemoryStore::new()))
        }
    }

    struct FailingFactory;

    #[async_trait]
    impl StoreFactory for FailingFactory {
        fn backend_name(&self) -> &'static str {
            "failing"
        }
        async fn create(&self, _config: &StoreConfig) -> Result<Arc<dyn KeyValueStore>, StoreError> {
            Err(StoreError::Unavailable("intentional failure".to_string()))
        }
    }

    fn stub_factory(name: &'static str) -> (Box<dyn StoreFactory>, Arc<AtomicBool>) {
        let flag = Arc::new(AtomicBool::new(false));
        (
            Box::new(StubFactory {
                name,
                called: flag.clone(),
            }),
            flag,
        )
    }

    fn config(backend: &str) -> StoreConfig {
        StoreConfig {
            backend: backend.to_string(),
            connection_string: String::new(),
        }
    }

    // ── StoreConfig ──────────────────────────────────────────────────────
    #[test]
    fn store_config_default_is_memory() {
        let cfg = StoreConfig::default();
        assert_eq!(cfg.backend, "memory");
        assert_eq!(cfg.connection_string, "");
    }

    // ── registration ─────────────────────────────────────────────────────
    #[test]
    fn new_registry_has_no_backends() {
        assert!(StoreRegistry::new().available_backends().is_empty());
        assert!(StoreRegistry::default().available_backends().is_empty());
    }

    #[test]
    fn with_memory_registers_memory_backend() {
        assert_eq!(StoreRegistry::with_memory().available_backends(), vec!["memory"]);
    }

    #[test]
    fn available_backends_is_sorted() {
        let mut reg = StoreRegistry::new();
        let (f1, _) = stub_factory("sqlite");
        let (f2, _) = stub_factory("memory");
        reg.register(f1);
        reg.register(f2);
        assert_eq!(reg.available_backends(), vec!["memory", "sqlite"]);
    }

    #[test]
    fn duplicate_registration_replaces_previous() {
        let mut reg = StoreRegistry::new();
        let (old, _) = stub_factory("sqlite");
        let (new, _) = stub_factory("sqlite");
        reg.register(old);
        reg.register(new);
        assert_eq!(reg.available_backends(), vec!["sqlite"]);
    }

    // ── dispatch ─────────────────────────────────────────────────────────
    #[tokio::test]
    async fn create_calls_matching_factory_only() {
        let mut reg = StoreRegistry::new();
        let (sqlite_factory, sqlite_called) = stub_factory("sqlite");
        let (other_factory, other_called) = stub_factory("other");
        reg.register(sqlite_factory);
        reg.register(other_factory);

        let result = reg.create(&config("sqlite")).await;

        assert!(result.is_ok(), "expected Ok, got {:#?}", result.err());
        assert!(sqlite_called.load(Ordering::SeqCst));
        assert!(!other_called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn memory_factory_creates_independent_stores() {
        let reg = StoreRegistry::with_memory();

        let first = reg.create(&StoreConfig::default()).await.unwrap();
        let second = reg.create(&StoreConfig::default()).await.unwrap();
        first.put("k", "v").await.unwrap();

        assert_eq!(second.get("k").await, Ok(None));
    }

    #[tokio::test]
    async fn configuration_error_names_requested_and_available_backends() {
        let reg = StoreRegistry::with_memory();

        match reg.create(&config("postgres")).await {
            Err(StoreError::Configuration(msg)) => {
                assert!(msg.contains("postgres"), "error should name the requested backend");
                assert!(msg.contains("memory"), "error should list available backends");
            }
            Err(other) => panic!("expected Configuration error, got {other:#?}"),
            Ok(_) => panic!("expected Configuration error, got a store"),
        }
    }

    #[tokio::test]
    async fn create_propagates_factory_error() {
        let mut reg = StoreRegistry::new();
        reg.register(Box::new(FailingFactory));

        assert!(matches!(
            reg.create(&config("failing")).await,
            Err(StoreError::Unavailable(msg)) if msg == "intentional failure"
        ));
    }
}
