use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use super::adapters::{
    CacheTokenStorage, ClientSettings, FileCacheStore, InMemoryCacheStore, InMemoryTokenStorage,
    KeycloakClient,
};
use crate::application::ports::{
    CacheStore, ConfigurationPort, KeycloakAdminConfig, TokenStorage, CONFIG_FILE_NAME,
};
use crate::application::services::Container;
use crate::domain::errors::{AdminError, AdminResult, ConfigError};

/// Short alias the client is registered under, next to its type key
pub const SERVICE_ALIAS: &str = "keycloak-admin";

/// Result of [`KeycloakServiceProvider::publish_config`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Written(PathBuf),
    /// The target already existed and `force` was not set
    Skipped(PathBuf),
}

/// Registers the Keycloak admin client in a [`Container`].
///
/// The client is built lazily on first resolution from the
/// [`KeycloakAdminConfig`] bound in the container, so rebinding the config and
/// calling `forget_instance::<KeycloakClient>()` yields a client with the new
/// settings.
pub struct KeycloakServiceProvider {
    config: KeycloakAdminConfig,
    cache: Arc<dyn CacheStore>,
}

impl KeycloakServiceProvider {
    pub fn new(config: &dyn ConfigurationPort, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            config: config.admin_config().clone(),
            cache,
        }
    }

    /// Use a file cache when `cache_path` is set, otherwise a process-local one
    pub fn from_config(config: &dyn ConfigurationPort) -> Self {
        let cache: Arc<dyn CacheStore> = match &config.admin_config().cache_path {
            Some(path) => Arc::new(FileCacheStore::new(path.clone())),
            None => Arc::new(InMemoryCacheStore::new()),
        };
        Self::new(config, cache)
    }

    pub fn config(&self) -> &KeycloakAdminConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    pub fn register(&self, container: &Container) {
        container.instance(self.config.clone());

        let cache = self.cache.clone();
        container.singleton::<KeycloakClient, _, AdminError>(move |c| {
            let config = c.make::<KeycloakAdminConfig>()?;
            build_client(&config, cache.clone())
        });
        container.alias::<KeycloakClient>(SERVICE_ALIAS);

        info!(
            "Registered Keycloak admin client (alias {}, cache storage {})",
            SERVICE_ALIAS,
            if self.config.use_cache { "on" } else { "off" }
        );
    }

    /// Write the package default configuration to `directory/keycloak-admin.toml`
    pub fn publish_config(
        &self,
        directory: &Path,
        force: bool,
    ) -> Result<PublishOutcome, ConfigError> {
        let target = directory.join(CONFIG_FILE_NAME);
        if target.exists() && !force {
            info!("Configuration already published at {}", target.display());
            return Ok(PublishOutcome::Skipped(target));
        }

        let document = KeycloakAdminConfig::default().to_toml_string()?;
        std::fs::create_dir_all(directory)
            .and_then(|_| std::fs::write(&target, document))
            .map_err(|e| ConfigError::FileError {
                message: format!("Failed to write {}: {e}", target.display()),
            })?;

        info!("Published configuration to {}", target.display());
        Ok(PublishOutcome::Written(target))
    }
}

/// Build a client from configuration, choosing the token storage by the
/// `use_laravel_cache` flag.
pub fn build_client(
    config: &KeycloakAdminConfig,
    cache: Arc<dyn CacheStore>,
) -> AdminResult<KeycloakClient> {
    let settings = ClientSettings::from_config(config)?;

    let storage: Arc<dyn TokenStorage> = if config.use_cache {
        Arc::new(CacheTokenStorage::with_keys(
            cache,
            config.access_token_cache_key.clone(),
            config.refresh_token_cache_key.clone(),
        ))
    } else {
        Arc::new(InMemoryTokenStorage::new())
    };

    Ok(KeycloakClient::new(settings, storage))
}
