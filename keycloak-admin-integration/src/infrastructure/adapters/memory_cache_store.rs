use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::application::ports::CacheStore;
use crate::domain::errors::CacheError;

/// Process-local cache store.
///
/// Clones share the same entries, so every handle handed out by the
/// application observes the same values.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCacheStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Remove every entry
    pub async fn flush(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn put(&self, key: &str, value: String) -> Result<(), CacheError> {
        debug!("cache put {}", key);
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn has(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.read().await.contains_key(key))
    }

    async fn forget(&self, key: &str) -> Result<bool, CacheError> {
        debug!("cache forget {}", key);
        Ok(self.entries.write().await.remove(key).is_some())
    }
}
