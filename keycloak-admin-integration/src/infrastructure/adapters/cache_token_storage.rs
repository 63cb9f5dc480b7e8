use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::application::ports::{
    CacheStore, TokenSlot, TokenStorage, DEFAULT_ACCESS_TOKEN_CACHE_KEY,
    DEFAULT_REFRESH_TOKEN_CACHE_KEY,
};
use crate::domain::errors::TokenStorageError;
use crate::domain::token::Token;

/// Token storage backed by the application's cache store.
///
/// A pure pass-through: tokens are written as their compact encoding with no
/// expiry, and read back by parsing whatever the cache holds. Parse and cache
/// failures are returned as-is.
#[derive(Clone)]
pub struct CacheTokenStorage {
    cache: Arc<dyn CacheStore>,
    access_token_cache_key: String,
    refresh_token_cache_key: String,
}

impl CacheTokenStorage {
    /// Use the default cache keys
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self::with_keys(
            cache,
            DEFAULT_ACCESS_TOKEN_CACHE_KEY,
            DEFAULT_REFRESH_TOKEN_CACHE_KEY,
        )
    }

    /// The two keys should differ; identical keys make the slots overwrite
    /// each other.
    pub fn with_keys(
        cache: Arc<dyn CacheStore>,
        access_token_cache_key: impl Into<String>,
        refresh_token_cache_key: impl Into<String>,
    ) -> Self {
        Self {
            cache,
            access_token_cache_key: access_token_cache_key.into(),
            refresh_token_cache_key: refresh_token_cache_key.into(),
        }
    }

    pub fn access_token_cache_key(&self) -> &str {
        &self.access_token_cache_key
    }

    pub fn refresh_token_cache_key(&self) -> &str {
        &self.refresh_token_cache_key
    }

    pub fn cache_key(&self, slot: TokenSlot) -> &str {
        match slot {
            TokenSlot::Access => &self.access_token_cache_key,
            TokenSlot::Refresh => &self.refresh_token_cache_key,
        }
    }

    async fn store(&self, slot: TokenSlot, token: &Token) -> Result<(), TokenStorageError> {
        let key = self.cache_key(slot);
        debug!("Storing {} token under cache key {}", slot, key);
        self.cache.put(key, token.to_string()).await?;
        Ok(())
    }

    async fn retrieve(&self, slot: TokenSlot) -> Result<Option<Token>, TokenStorageError> {
        let key = self.cache_key(slot);
        if !self.cache.has(key).await? {
            debug!("No {} token cached under {}", slot, key);
            return Ok(None);
        }

        // The entry can be evicted between `has` and `get`.
        match self.cache.get(key).await? {
            Some(raw) => Ok(Some(Token::parse(&raw)?)),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for CacheTokenStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheTokenStorage")
            .field("access_token_cache_key", &self.access_token_cache_key)
            .field("refresh_token_cache_key", &self.refresh_token_cache_key)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenStorage for CacheTokenStorage {
    async fn store_access_token(&self, access_token: &Token) -> Result<(), TokenStorageError> {
        self.store(TokenSlot::Access, access_token).await
    }

    async fn store_refresh_token(&self, refresh_token: &Token) -> Result<(), TokenStorageError> {
        self.store(TokenSlot::Refresh, refresh_token).await
    }

    async fn retrieve_access_token(&self) -> Result<Option<Token>, TokenStorageError> {
        self.retrieve(TokenSlot::Access).await
    }

    async fn retrieve_refresh_token(&self) -> Result<Option<Token>, TokenStorageError> {
        self.retrieve(TokenSlot::Refresh).await
    }
}
