pub mod cache;
pub mod config;
pub mod token_storage;

pub use cache::*;
pub use config::*;
pub use token_storage::*;
