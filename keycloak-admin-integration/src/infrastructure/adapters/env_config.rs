use std::path::Path;

use crate::application::ports::{ConfigurationPort, KeycloakAdminConfig};
use crate::domain::errors::ConfigError;

/// Environment-based configuration adapter.
///
/// Layers, lowest first: package defaults, an optional TOML file, then
/// environment variables.
#[derive(Debug, Clone)]
pub struct EnvConfigurationAdapter {
    config: KeycloakAdminConfig,
}

impl EnvConfigurationAdapter {
    pub fn new() -> Self {
        Self {
            config: KeycloakAdminConfig::from_env(),
        }
    }

    /// A missing file is not an error; the defaults stand in for it.
    pub fn with_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            KeycloakAdminConfig::load_file(path)?
        } else {
            KeycloakAdminConfig::default()
        };
        config.apply_env();
        Ok(Self { config })
    }

    pub fn into_config(self) -> KeycloakAdminConfig {
        self.config
    }
}

impl Default for EnvConfigurationAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationPort for EnvConfigurationAdapter {
    fn admin_config(&self) -> &KeycloakAdminConfig {
        &self.config
    }
}
