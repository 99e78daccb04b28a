//! Parser error types.

use crate::lexer::{Span, TokenKind};

/// A syntax error in a select expression.
///
/// Parsing stops at the first error; `remainder` holds the exact
/// unconsumed input starting at the failure point.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at `{remainder}`")]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// The location of the offending token.
    pub span: Span,
    /// Unconsumed input from the failure point to the end.
    pub remainder: String,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(message: impl Into<String>, span: Span, input: &str) -> Self {
        Self {
            message: message.into(),
            span,
            remainder: String::from(span.remainder(input)),
        }
    }

    /// Creates an "unexpected token" error.
    #[must_use]
    pub fn unexpected(expected: &str, found: &TokenKind, span: Span, input: &str) -> Self {
        let message = match found {
            TokenKind::Eof => format!("Unexpected end of input: expected {expected}"),
            TokenKind::Error(lex) => lex.clone(),
            other => format!("Expected {expected}, found {other}"),
        };
        Self::new(message, span, input)
    }
}
