/*!
# Keycloak Admin Integration

Registers a Keycloak admin client as a shared service in an application
container and, optionally, keeps its OAuth tokens in the application's cache
store instead of process memory.

This crate provides:
- A [`Container`](application::services::Container) mapping types and string
  aliases to lazily built shared instances
- [`KeycloakServiceProvider`](infrastructure::KeycloakServiceProvider), which
  binds one [`KeycloakClient`](infrastructure::adapters::KeycloakClient) under
  its type and the `"keycloak-admin"` alias
- [`CacheTokenStorage`](infrastructure::adapters::CacheTokenStorage), a
  pass-through from the client's token storage contract to any
  [`CacheStore`](application::ports::CacheStore)

## Architecture

```text
┌─────────────────────────────────────────────────────────────┐
│                     Composition                             │
├─────────────────────────────────────────────────────────────┤
│  • KeycloakServiceProvider   • KeycloakAdminFacade          │
│  • Container                                                │
└─────────────────────────────────────────────────────────────┘
                              │
┌─────────────────────────────────────────────────────────────┐
│                       Ports                                 │
├─────────────────────────────────────────────────────────────┤
│  • TokenStorage      • CacheStore      • ConfigurationPort  │
└─────────────────────────────────────────────────────────────┘
                              │
┌─────────────────────────────────────────────────────────────┐
│                      Adapters                               │
├─────────────────────────────────────────────────────────────┤
│  • CacheTokenStorage        • InMemoryTokenStorage          │
│  • InMemoryCacheStore       • FileCacheStore                │
│  • StoredTokenSupplier      • KeycloakClient                │
│  • EnvConfigurationAdapter                                  │
└─────────────────────────────────────────────────────────────┘
```

## Usage

```rust,no_run
use keycloak_admin_integration::{
    application::services::Container,
    infrastructure::{KeycloakAdminFacade, KeycloakServiceProvider},
    infrastructure::adapters::EnvConfigurationAdapter,
};

# async fn run() -> Result<(), Box<dyn std::error::Error>> {
let container = Container::new();
let config = EnvConfigurationAdapter::new();
KeycloakServiceProvider::from_config(&config).register(&container);

let keycloak = KeycloakAdminFacade::resolve(&container)?;
let realms = keycloak.realms().await?;
# Ok(())
# }
```
*/

pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::ports::*;
pub use application::services::*;
pub use domain::*;
pub use infrastructure::adapters::*;
pub use infrastructure::*;
