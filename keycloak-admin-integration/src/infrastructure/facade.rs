use std::ops::Deref;
use std::sync::Arc;

use super::adapters::KeycloakClient;
use crate::application::services::Container;
use crate::domain::errors::ContainerError;

/// Handle to the shared [`KeycloakClient`], resolved once from a container
/// and passed to callers by value.
#[derive(Debug, Clone)]
pub struct KeycloakAdminFacade {
    root: Arc<KeycloakClient>,
}

impl KeycloakAdminFacade {
    pub fn resolve(container: &Container) -> Result<Self, ContainerError> {
        Ok(Self {
            root: container.make::<KeycloakClient>()?,
        })
    }

    pub fn from_client(client: Arc<KeycloakClient>) -> Self {
        Self { root: client }
    }

    pub fn root(&self) -> &Arc<KeycloakClient> {
        &self.root
    }
}

impl Deref for KeycloakAdminFacade {
    type Target = KeycloakClient;

    fn deref(&self) -> &Self::Target {
        &self.root
    }
}
