use keycloak::types::RealmRepresentation;
use keycloak::KeycloakAdmin;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::token_supplier::{AdminCredentials, StoredTokenSupplier};
use crate::application::ports::{
    ConfigurationPort, TokenStorage, DEFAULT_CLIENT_ID, DEFAULT_REALM,
};
use crate::domain::errors::{AdminError, AdminResult, ConfigError};
use crate::domain::token::Token;

/// Connection settings for [`KeycloakClient`]
#[derive(Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub realm: String,
    pub client_id: String,
}

impl ClientSettings {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            realm: DEFAULT_REALM.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
        }
    }

    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Fails with `MissingRequired` when base URL, username or password is unset.
    /// No other checks: a bad URL only shows up on the first request.
    pub fn from_config(config: &dyn ConfigurationPort) -> Result<Self, ConfigError> {
        let config = config.admin_config();
        Ok(Self::new(
            config.required_base_url()?,
            config.required_username()?,
            config.required_password()?,
        )
        .with_realm(config.realm.clone())
        .with_client_id(config.client_id.clone()))
    }
}

impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// Long-lived Keycloak admin client.
///
/// Every resource endpoint of the admin REST API is reachable through
/// [`KeycloakClient::admin`]; tokens are supplied from the configured
/// [`TokenStorage`]. Construction performs no network I/O.
pub struct KeycloakClient {
    settings: ClientSettings,
    admin: KeycloakAdmin<StoredTokenSupplier>,
    supplier: StoredTokenSupplier,
    http: reqwest::Client,
}

impl KeycloakClient {
    pub fn new(settings: ClientSettings, storage: Arc<dyn TokenStorage>) -> Self {
        Self::with_http_client(settings, storage, reqwest::Client::new())
    }

    pub fn with_http_client(
        settings: ClientSettings,
        storage: Arc<dyn TokenStorage>,
        http: reqwest::Client,
    ) -> Self {
        let credentials = AdminCredentials {
            username: settings.username.clone(),
            password: settings.password.clone(),
            realm: settings.realm.clone(),
            client_id: settings.client_id.clone(),
        };
        let supplier = StoredTokenSupplier::new(&settings.base_url, credentials, storage, http.clone());
        let admin = KeycloakAdmin::new(&settings.base_url, supplier.clone(), http.clone());

        Self {
            settings,
            admin,
            supplier,
            http,
        }
    }

    /// Generated admin REST API (users, roles, realms, groups, clients,
    /// organizations, attack detection, ...)
    pub fn admin(&self) -> &KeycloakAdmin<StoredTokenSupplier> {
        &self.admin
    }

    pub fn base_url(&self) -> &str {
        &self.settings.base_url
    }

    pub fn realm(&self) -> &str {
        &self.settings.realm
    }

    pub fn username(&self) -> &str {
        &self.settings.username
    }

    pub fn token_storage(&self) -> &Arc<dyn TokenStorage> {
        self.supplier.storage()
    }

    /// A valid access token, from storage or freshly obtained
    pub async fn access_token(&self) -> AdminResult<Token> {
        self.supplier.access_token().await
    }

    pub async fn realms(&self) -> AdminResult<Vec<RealmRepresentation>> {
        self.get_json("admin/realms").await
    }

    pub async fn server_info(&self) -> AdminResult<Value> {
        self.get_json("admin/serverinfo").await
    }

    /// Keycloak server version as reported by `systemInfo.version`
    pub async fn version(&self) -> AdminResult<String> {
        let info = self.server_info().await?;
        info.pointer("/systemInfo/version")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AdminError::Serialization {
                message: "server info carries no systemInfo.version".to_string(),
            })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AdminResult<T> {
        let url = format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path);
        let token = self.access_token().await?;
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token.as_str())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AdminError::Http {
                status: status.as_u16(),
                message: error_text,
            });
        }

        response.json().await.map_err(|e| AdminError::Serialization {
            message: format!("Failed to parse response from {url}: {e}"),
        })
    }
}

impl std::fmt::Debug for KeycloakClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeycloakClient")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
