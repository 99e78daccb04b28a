//! Select-expression lexer.
//!
//! This module provides a hand-written lexer for the select language that
//! produces a stream of tokens carrying byte spans into the input.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Token, TokenKind};
pub use tokenizer::{Lexer, is_identifier_char};
