pub mod token_handler;

pub use token_handler::{__path_generate_token, generate_token, TokenState};
