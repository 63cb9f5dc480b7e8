pub mod adapters;
pub mod facade;
pub mod service_provider;

pub use facade::KeycloakAdminFacade;
pub use service_provider::*;
