use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{TokenSlot, TokenStorage};
use crate::domain::errors::TokenStorageError;
use crate::domain::token::Token;

/// Instance-local token storage, used when cache storage is disabled
#[derive(Debug, Default)]
pub struct InMemoryTokenStorage {
    access_token: RwLock<Option<Token>>,
    refresh_token: RwLock<Option<Token>>,
}

impl InMemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, slot: TokenSlot) -> &RwLock<Option<Token>> {
        match slot {
            TokenSlot::Access => &self.access_token,
            TokenSlot::Refresh => &self.refresh_token,
        }
    }
}

#[async_trait]
impl TokenStorage for InMemoryTokenStorage {
    async fn store_access_token(&self, access_token: &Token) -> Result<(), TokenStorageError> {
        *self.slot(TokenSlot::Access).write().await = Some(access_token.clone());
        Ok(())
    }

    async fn store_refresh_token(&self, refresh_token: &Token) -> Result<(), TokenStorageError> {
        *self.slot(TokenSlot::Refresh).write().await = Some(refresh_token.clone());
        Ok(())
    }

    async fn retrieve_access_token(&self) -> Result<Option<Token>, TokenStorageError> {
        Ok(self.slot(TokenSlot::Access).read().await.clone())
    }

    async fn retrieve_refresh_token(&self) -> Result<Option<Token>, TokenStorageError> {
        Ok(self.slot(TokenSlot::Refresh).read().await.clone())
    }
}
