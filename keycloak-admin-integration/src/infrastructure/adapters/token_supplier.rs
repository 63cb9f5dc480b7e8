use async_trait::async_trait;
use chrono::Duration;
use keycloak::{KeycloakError, KeycloakTokenSupplier};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::application::ports::{TokenSlot, TokenStorage};
use crate::domain::errors::{AdminError, AdminResult, TokenStorageError};
use crate::domain::token::Token;

/// Stored access tokens closer than this to expiry are not handed out
const ACCESS_TOKEN_LEEWAY_SECONDS: i64 = 30;

/// Raw token response from Keycloak
#[derive(Debug, Clone, Deserialize)]
struct RawTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    refresh_expires_in: Option<i64>,
}

/// Admin credentials for the password grant
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
    pub realm: String,
    pub client_id: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy)]
enum Grant {
    Password,
    RefreshToken,
}

impl Grant {
    fn failure(self, reason: String) -> AdminError {
        match self {
            Grant::Password => AdminError::TokenAcquisitionFailed { reason },
            Grant::RefreshToken => AdminError::TokenRefreshFailed { reason },
        }
    }
}

struct SupplierInner {
    token_url: String,
    credentials: AdminCredentials,
    storage: Arc<dyn TokenStorage>,
    http: reqwest::Client,
    // Serialises lookup, refresh and acquisition within one client.
    exchange_lock: Mutex<()>,
}

/// Supplies bearer tokens to `KeycloakAdmin`, persisting them through a
/// [`TokenStorage`].
///
/// Order of preference: a stored access token that is not about to expire,
/// then a refresh-token grant, then a password grant. Unreadable stored
/// tokens count as missing; storage backend failures are returned.
#[derive(Clone)]
pub struct StoredTokenSupplier {
    inner: Arc<SupplierInner>,
}

impl StoredTokenSupplier {
    pub fn new(
        base_url: &str,
        credentials: AdminCredentials,
        storage: Arc<dyn TokenStorage>,
        http: reqwest::Client,
    ) -> Self {
        let token_url = format!(
            "{}/realms/{}/protocol/openid-connect/token",
            base_url.trim_end_matches('/'),
            credentials.realm
        );

        Self {
            inner: Arc::new(SupplierInner {
                token_url,
                credentials,
                storage,
                http,
                exchange_lock: Mutex::new(()),
            }),
        }
    }

    pub fn token_url(&self) -> &str {
        &self.inner.token_url
    }

    pub fn storage(&self) -> &Arc<dyn TokenStorage> {
        &self.inner.storage
    }

    pub async fn access_token(&self) -> AdminResult<Token> {
        let _guard = self.inner.exchange_lock.lock().await;
        let leeway = Duration::seconds(ACCESS_TOKEN_LEEWAY_SECONDS);

        let stored = self.inner.storage.retrieve_access_token().await;
        if let Some(token) = usable(stored, TokenSlot::Access, leeway)? {
            debug!("Reusing stored access token");
            return Ok(token);
        }

        let stored = self.inner.storage.retrieve_refresh_token().await;
        if let Some(refresh_token) = usable(stored, TokenSlot::Refresh, Duration::zero())? {
            match self.refresh(&refresh_token).await {
                Ok(token) => return Ok(token),
                Err(AdminError::TokenStorage(e)) => return Err(e.into()),
                Err(e) => warn!("Token refresh failed, re-authenticating: {}", e),
            }
        }

        self.acquire().await
    }

    async fn acquire(&self) -> AdminResult<Token> {
        let credentials = &self.inner.credentials;
        info!(
            "Acquiring admin token for {} in realm {}",
            credentials.username, credentials.realm
        );

        let form = [
            ("grant_type", "password"),
            ("client_id", credentials.client_id.as_str()),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ];
        let raw = self.exchange(Grant::Password, &form).await?;
        self.persist(Grant::Password, raw).await
    }

    async fn refresh(&self, refresh_token: &Token) -> AdminResult<Token> {
        info!("Refreshing admin token in realm {}", self.inner.credentials.realm);

        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.inner.credentials.client_id.as_str()),
            ("refresh_token", refresh_token.as_str()),
        ];
        let raw = self.exchange(Grant::RefreshToken, &form).await?;
        self.persist(Grant::RefreshToken, raw).await
    }

    async fn exchange(&self, grant: Grant, form: &[(&str, &str)]) -> AdminResult<RawTokenResponse> {
        let response = self
            .inner
            .http
            .post(&self.inner.token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| grant.failure(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AdminError::Http {
                status: status.as_u16(),
                message: format!("{grant:?} grant rejected: {error_text}"),
            });
        }

        response
            .json()
            .await
            .map_err(|e| grant.failure(format!("Failed to parse token response: {e}")))
    }

    async fn persist(&self, grant: Grant, raw: RawTokenResponse) -> AdminResult<Token> {
        let access_token = Token::parse(&raw.access_token)
            .map_err(|e| grant.failure(format!("Unreadable access token: {e}")))?;
        self.inner.storage.store_access_token(&access_token).await?;

        if let Some(refresh) = raw.refresh_token.as_deref() {
            let refresh_token = Token::parse(refresh)
                .map_err(|e| grant.failure(format!("Unreadable refresh token: {e}")))?;
            self.inner.storage.store_refresh_token(&refresh_token).await?;
        }

        debug!(
            "Stored new tokens (expires_in={:?}, refresh_expires_in={:?})",
            raw.expires_in, raw.refresh_expires_in
        );
        Ok(access_token)
    }
}

fn usable(
    stored: Result<Option<Token>, TokenStorageError>,
    slot: TokenSlot,
    leeway: Duration,
) -> AdminResult<Option<Token>> {
    match stored {
        Ok(Some(token)) if !token.is_expiring_within(leeway) => Ok(Some(token)),
        Ok(Some(_)) => {
            debug!("Stored {} token has expired", slot);
            Ok(None)
        }
        Ok(None) => Ok(None),
        Err(TokenStorageError::Parse(e)) => {
            warn!("Discarding unreadable stored {} token: {}", slot, e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn into_keycloak_error(err: AdminError) -> KeycloakError {
    match err {
        AdminError::Keycloak(e) => e,
        AdminError::Http { status, message } => KeycloakError::HttpFailure {
            status,
            body: None,
            text: message,
        },
        AdminError::TokenStorage(e) => KeycloakError::HttpFailure {
            status: 500,
            body: None,
            text: e.to_string(),
        },
        other => KeycloakError::HttpFailure {
            status: 401,
            body: None,
            text: other.to_string(),
        },
    }
}

#[async_trait]
impl KeycloakTokenSupplier for StoredTokenSupplier {
    async fn get(&self, _url: &str) -> Result<String, KeycloakError> {
        self.access_token()
            .await
            .map(|token| token.to_string())
            .map_err(into_keycloak_error)
    }
}
