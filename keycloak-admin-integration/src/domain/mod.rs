pub mod errors;
pub mod token;

pub use errors::*;
pub use token::Token;
