use async_trait::async_trait;
use std::fmt;

use crate::domain::errors::TokenStorageError;
use crate::domain::token::Token;

/// The two positions a token can occupy in storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenSlot {
    Access,
    Refresh,
}

impl fmt::Display for TokenSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSlot::Access => write!(f, "access"),
            TokenSlot::Refresh => write!(f, "refresh"),
        }
    }
}

/// Token persistence contract consumed by the admin client
#[async_trait]
pub trait TokenStorage: Send + Sync {
    async fn store_access_token(&self, access_token: &Token) -> Result<(), TokenStorageError>;

    async fn store_refresh_token(&self, refresh_token: &Token) -> Result<(), TokenStorageError>;

    /// `Ok(None)` when nothing has been stored yet
    async fn retrieve_access_token(&self) -> Result<Option<Token>, TokenStorageError>;

    /// `Ok(None)` when nothing has been stored yet
    async fn retrieve_refresh_token(&self) -> Result<Option<Token>, TokenStorageError>;
}
