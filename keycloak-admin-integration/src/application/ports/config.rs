use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::errors::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "admin";
pub const DEFAULT_REALM: &str = "master";
pub const DEFAULT_CLIENT_ID: &str = "admin-cli";
pub const DEFAULT_ACCESS_TOKEN_CACHE_KEY: &str = "laravel-keycloak-admin-cache-token";
pub const DEFAULT_REFRESH_TOKEN_CACHE_KEY: &str = "laravel-keycloak-admin-cache-refresh-token";

/// File name used when publishing the default configuration
pub const CONFIG_FILE_NAME: &str = "keycloak-admin.toml";

pub const ENV_BASE_URL: &str = "KEYCLOAK_ADMIN_BASE_URL";
pub const ENV_BASE_URL_FALLBACK: &str = "KEYCLOAK_BASE_URL";
pub const ENV_USERNAME: &str = "KEYCLOAK_ADMIN_USERNAME";
pub const ENV_PASSWORD: &str = "KEYCLOAK_ADMIN_PASSWORD";
pub const ENV_USE_CACHE: &str = "KEYCLOAK_ADMIN_USE_LARAVEL_CACHE";
pub const ENV_ACCESS_TOKEN_CACHE_KEY: &str = "KEYCLOAK_ADMIN_ACCESS_TOKEN_CACHE_KEY";
pub const ENV_REFRESH_TOKEN_CACHE_KEY: &str = "KEYCLOAK_ADMIN_REFRESH_TOKEN_CACHE_KEY";
pub const ENV_REALM: &str = "KEYCLOAK_ADMIN_REALM";
pub const ENV_CLIENT_ID: &str = "KEYCLOAK_ADMIN_CLIENT_ID";
pub const ENV_CACHE_PATH: &str = "KEYCLOAK_ADMIN_CACHE_PATH";

/// Configuration port for accessing the admin client settings
pub trait ConfigurationPort: Send + Sync {
    fn admin_config(&self) -> &KeycloakAdminConfig;
}

/// Settings for the Keycloak admin client and its token storage.
///
/// `base_url`, `username` and `password` are optional so that a cleared
/// configuration is representable; the client refuses to build without them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeycloakAdminConfig {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "use_laravel_cache", deserialize_with = "deserialize_flag")]
    pub use_cache: bool,
    pub access_token_cache_key: String,
    pub refresh_token_cache_key: String,
    pub realm: String,
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<PathBuf>,
}

impl Default for KeycloakAdminConfig {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            username: Some(DEFAULT_USERNAME.to_string()),
            password: Some(DEFAULT_PASSWORD.to_string()),
            use_cache: true,
            access_token_cache_key: DEFAULT_ACCESS_TOKEN_CACHE_KEY.to_string(),
            refresh_token_cache_key: DEFAULT_REFRESH_TOKEN_CACHE_KEY.to_string(),
            realm: DEFAULT_REALM.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            cache_path: None,
        }
    }
}

impl ConfigurationPort for KeycloakAdminConfig {
    fn admin_config(&self) -> &KeycloakAdminConfig {
        self
    }
}

impl KeycloakAdminConfig {
    /// Load configuration from environment variables over the defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Parse a TOML document; keys it leaves out keep their default values
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        toml::from_str(document).map_err(|e| ConfigError::FileError {
            message: format!("Failed to parse configuration: {e}"),
        })
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|e| ConfigError::FileError {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::from_toml_str(&document)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::FileError {
            message: format!("Failed to render configuration: {e}"),
        })
    }

    pub fn apply_env(&mut self) {
        self.apply_lookup(|name| std::env::var(name).ok());
    }

    /// Override values from a variable lookup.
    ///
    /// The base URL honours `KEYCLOAK_ADMIN_BASE_URL` first and falls back to
    /// `KEYCLOAK_BASE_URL`.
    pub fn apply_lookup<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).or_else(|| lookup(ENV_BASE_URL_FALLBACK)) {
            self.base_url = Some(url);
        }
        if let Some(username) = lookup(ENV_USERNAME) {
            self.username = Some(username);
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.password = Some(password);
        }
        if let Some(flag) = lookup(ENV_USE_CACHE) {
            self.use_cache = parse_flag(&flag);
        }
        if let Some(key) = lookup(ENV_ACCESS_TOKEN_CACHE_KEY) {
            self.access_token_cache_key = key;
        }
        if let Some(key) = lookup(ENV_REFRESH_TOKEN_CACHE_KEY) {
            self.refresh_token_cache_key = key;
        }
        if let Some(realm) = lookup(ENV_REALM) {
            self.realm = realm;
        }
        if let Some(client_id) = lookup(ENV_CLIENT_ID) {
            self.client_id = client_id;
        }
        if let Some(path) = lookup(ENV_CACHE_PATH) {
            self.cache_path = Some(PathBuf::from(path));
        }
    }

    pub fn required_base_url(&self) -> Result<&str, ConfigError> {
        required(&self.base_url, "base_url")
    }

    pub fn required_username(&self) -> Result<&str, ConfigError> {
        required(&self.username, "username")
    }

    pub fn required_password(&self) -> Result<&str, ConfigError> {
        required(&self.password, "password")
    }
}

fn required<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str, ConfigError> {
    value.as_deref().ok_or_else(|| ConfigError::MissingRequired {
        key: key.to_string(),
    })
}

/// Interpret a configuration flag the way env-style booleans are read.
///
/// The keywords `false`, `null` and `empty` (bare or parenthesised, any case)
/// are falsy, as are the empty string and `"0"`. Every other string is truthy,
/// including `"no"`, `"off"` and whitespace.
pub fn parse_flag(value: &str) -> bool {
    if value.is_empty() || value == "0" {
        return false;
    }
    !matches!(
        value.to_lowercase().as_str(),
        "false" | "(false)" | "null" | "(null)" | "empty" | "(empty)"
    )
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match FlagValue::deserialize(deserializer)? {
        FlagValue::Bool(flag) => flag,
        FlagValue::Integer(n) => n != 0,
        FlagValue::Text(text) => parse_flag(&text),
    })
}
