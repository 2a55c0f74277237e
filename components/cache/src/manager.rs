use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::{
    backend::{memory::MemoryBackend, open_backend, BackendRef, CacheBackend},
    config::CacheConfig,
    err::Result,
    record::Record,
};

/// Front door of the cache: forwards every call to the active backend and
/// lets that backend be replaced while callers keep running.
///
/// Entries are never migrated on a swap. Each call resolves the active
/// backend once, so it runs entirely against either the old or the new one.
#[derive(Debug)]
pub struct CacheManager {
    strategy: RwLock<BackendRef>,
}

impl Default for CacheManager {
    fn default() -> Self { Self::new(Arc::new(MemoryBackend::default())) }
}

impl CacheManager {
    pub fn new(backend: BackendRef) -> Self {
        Self {
            strategy: RwLock::new(backend),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        let backend = open_backend(&config.dsn)?;
        Ok(Self::new(backend))
    }

    /// Make `backend` the active one and hand back the previous backend so its
    /// owner can keep using or close it. The previous backend is not touched.
    pub async fn set_strategy(&self, backend: BackendRef) -> BackendRef {
        let mut strategy = self.strategy.write().await;
        debug!("cache strategy swapped: {:?} -> {:?}", *strategy, backend);
        std::mem::replace(&mut *strategy, backend)
    }

    /// The backend currently receiving calls.
    pub async fn strategy(&self) -> BackendRef { self.strategy.read().await.clone() }
}

#[async_trait]
impl CacheBackend for CacheManager {
    #[instrument(level = "trace", skip(self))]
    async fn get(&self, key: &str) -> Result<Option<Record>> {
        self.strategy().await.get(key).await
    }

    #[instrument(level = "trace", skip(self, value))]
    async fn set(&self, key: &str, value: Record) -> Result<()> {
        self.strategy().await.set(key, value).await
    }

    #[instrument(level = "trace", skip(self))]
    async fn delete(&self, key: &str) -> Result<bool> { self.strategy().await.delete(key).await }
}
