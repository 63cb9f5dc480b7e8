use async_trait::async_trait;

use crate::domain::errors::CacheError;

/// Minimal key-value cache capability.
///
/// Values never expire on their own through this interface; eviction is up
/// to the backend.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Store a value under `key`, replacing any previous value
    async fn put(&self, key: &str, value: String) -> Result<(), CacheError>;

    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Check whether `key` currently holds a value
    async fn has(&self, key: &str) -> Result<bool, CacheError>;

    /// Remove `key`, returning whether a value was present
    async fn forget(&self, key: &str) -> Result<bool, CacheError>;
}
