use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::CacheBackend;
use crate::{err::Result, record::Record};

/// MemoryBackend keeps records in process memory. Nothing survives the
/// backend being dropped.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: DashMap<String, Record>,
}

impl MemoryBackend {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Record>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: Record) -> Result<()> {
        if self.entries.insert(key.to_string(), value).is_some() {
            debug!("memory backend: overwrote {:?}", key);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> { Ok(self.entries.remove(key).is_some()) }
}
