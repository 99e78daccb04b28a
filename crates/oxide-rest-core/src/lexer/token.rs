//! Token types for the select-expression lexer.

use core::fmt;

use super::Span;

/// Token kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A bare identifier made of `[A-Za-z0-9_]`.
    Identifier(String),
    /// A double-quoted identifier (quotes stripped).
    QuotedIdentifier(String),

    /// `*`
    Star,
    /// `...`
    Ellipsis,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `::`
    DoubleColon,
    /// `!`
    Bang,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `.`
    Dot,
    /// `->`
    Arrow,
    /// `->>`
    DoubleArrow,

    /// Lexer error.
    Error(String),
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Returns the identifier text for bare or quoted identifiers.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::Identifier(name) | Self::QuotedIdentifier(name) => Some(name),
            _ => None,
        }
    }

    /// Returns true for a bare identifier equal to `word`.
    ///
    /// Quoted identifiers never match, so `"inner"` stays a plain name.
    #[must_use]
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, Self::Identifier(name) if name == word)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name) => write!(f, "identifier `{name}`"),
            Self::QuotedIdentifier(name) => write!(f, "identifier `\"{name}\"`"),
            Self::Star => f.write_str("`*`"),
            Self::Ellipsis => f.write_str("`...`"),
            Self::Comma => f.write_str("`,`"),
            Self::Colon => f.write_str("`:`"),
            Self::DoubleColon => f.write_str("`::`"),
            Self::Bang => f.write_str("`!`"),
            Self::LeftParen => f.write_str("`(`"),
            Self::RightParen => f.write_str("`)`"),
            Self::Dot => f.write_str("`.`"),
            Self::Arrow => f.write_str("`->`"),
            Self::DoubleArrow => f.write_str("`->>`"),
            Self::Error(message) => f.write_str(message),
            Self::Eof => f.write_str("end of input"),
        }
    }
}

/// A token with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token kind.
    pub kind: TokenKind,
    /// The source span of the token.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an end-of-input token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}
