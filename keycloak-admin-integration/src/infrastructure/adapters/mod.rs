pub mod admin_client;
pub mod cache_token_storage;
pub mod env_config;
pub mod file_cache_store;
pub mod memory_cache_store;
pub mod memory_token_storage;
pub mod token_supplier;

pub use admin_client::*;
pub use cache_token_storage::*;
pub use env_config::*;
pub use file_cache_store::*;
pub use memory_cache_store::*;
pub use memory_token_storage::*;
pub use token_supplier::*;
