use std::sync::Arc;

use wrs_access::{AccessPolicy, PermissiveAccess};
use wrs_store::{InMemoryStore, KeyValueStore};

use crate::config::ModelConfig;

/// Shared handles every record and collection carries.
///
/// Cloning is cheap: all three parts are reference-counted. The access
/// policy travels with the context so callers holding any record can check
/// capabilities; the model layer itself never consults it.
#[derive(Clone)]
pub struct Context {
    store: Arc<dyn KeyValueStore>,
    access: Arc<dyn AccessPolicy>,
    config: Arc<ModelConfig>,
}

impl Context {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        access: Arc<dyn AccessPolicy>,
        config: ModelConfig,
    ) -> Self {
        Self {
            store,
            access,
            config: Arc::new(config),
        }
    }

    /// A fresh in-memory store with permissive access and default config.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(PermissiveAccess),
            ModelConfig::default(),
        )
    }

    /// The same store and config seen through a different policy.
    pub fn with_access(&self, access: Arc<dyn AccessPolicy>) -> Self {
        Self {
            store: Arc::clone(&self.store),
            access,
            config: Arc::clone(&self.config),
        }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn access(&self) -> &dyn AccessPolicy {
        self.access.as_ref()
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
