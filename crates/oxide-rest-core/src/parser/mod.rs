//! Select-expression parser.
//!
//! A hand-written recursive descent parser over the token stream produced
//! by [`crate::lexer::Lexer`].

mod error;
mod parser;

pub use error::ParseError;
pub use parser::{Parser, clean_select, parse};
