//! Select-expression parser implementation.

use super::error::ParseError;
use crate::ast::{Aggregate, AggregateFunction, Field, JsonPath, Node};
use crate::lexer::{Lexer, Token, TokenKind};

/// Select-expression parser.
pub struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let tokens = Lexer::new(input).tokenize();
        Self {
            input,
            tokens,
            pos: 0,
        }
    }

    /// Parses a complete select expression.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` at the first token that does not fit the
    /// grammar, including any input left after the last node.
    pub fn parse_select(&mut self) -> Result<Vec<Node>, ParseError> {
        if self.check(&TokenKind::Eof) {
            return Err(ParseError::new(
                "Empty select expression",
                self.current().span,
                self.input,
            ));
        }

        let nodes = self.parse_node_list()?;

        match &self.current().kind {
            TokenKind::Eof => Ok(nodes),
            TokenKind::Error(message) => Err(ParseError::new(
                message.clone(),
                self.current().span,
                self.input,
            )),
            _ => Err(ParseError::new(
                "Unexpected input",
                self.current().span,
                self.input,
            )),
        }
    }

    /// Parses `node (',' node)*`.
    fn parse_node_list(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut nodes = vec![self.parse_node()?];
        while self.check(&TokenKind::Comma) {
            self.advance();
            nodes.push(self.parse_node()?);
        }
        Ok(nodes)
    }

    fn parse_node(&mut self) -> Result<Node, ParseError> {
        match self.current().kind {
            TokenKind::Star => {
                self.advance();
                Ok(Node::Star)
            }
            TokenKind::Ellipsis => self.parse_spread(),
            _ => Ok(Node::Field(self.parse_field()?)),
        }
    }

    /// Parses `'...' field`; the target must be an embedding.
    fn parse_spread(&mut self) -> Result<Node, ParseError> {
        let span = self.current().span;
        self.advance();
        let target = self.parse_field()?;
        if !target.is_embedding() {
            return Err(ParseError::new(
                "A spread operation must be done on an embedded resource",
                span,
                self.input,
            ));
        }
        Ok(Node::Spread { target })
    }

    /// Parses `[alias ':'] core`.
    fn parse_field(&mut self) -> Result<Field, ParseError> {
        let alias = if self.current().kind.identifier().is_some()
            && self.peek_kind(1) == Some(&TokenKind::Colon)
        {
            let alias = self.expect_identifier("alias")?;
            self.advance();
            Some(alias)
        } else {
            None
        };

        // `count()` is the row-count aggregate, never an empty embedding.
        if self.current().kind.is_word("count")
            && self.peek_kind(1) == Some(&TokenKind::LeftParen)
            && self.peek_kind(2) == Some(&TokenKind::RightParen)
        {
            self.advance();
            self.advance();
            self.advance();
            let cast = self.parse_optional_cast()?;
            return Ok(Field {
                name: String::from("count"),
                alias,
                aggregate: Some(Aggregate {
                    function: AggregateFunction::Count,
                    cast,
                    standalone: true,
                }),
                ..Field::default()
            });
        }

        let name = self.expect_identifier("field name")?;
        let mut field = Field {
            name,
            alias,
            ..Field::default()
        };

        if self.parse_hints(&mut field)? || self.check(&TokenKind::LeftParen) {
            field.children = self.parse_embedded_children()?;
            field.embedded = true;
            return Ok(field);
        }

        self.parse_simple_tail(&mut field)?;
        Ok(field)
    }

    /// Parses `('!' identifier)*` into the hint and join flag.
    ///
    /// Returns true when at least one `!` was consumed, in which case an
    /// embedding must follow.
    fn parse_hints(&mut self, field: &mut Field) -> Result<bool, ParseError> {
        let mut seen_bang = false;
        let mut seen_join = false;

        while self.check(&TokenKind::Bang) {
            self.advance();
            seen_bang = true;
            let span = self.current().span;
            let is_inner = self.current().kind.is_word("inner");
            let is_left = self.current().kind.is_word("left");
            let word = self.expect_identifier("hint after `!`")?;

            if is_inner {
                field.inner_join = true;
                seen_join = true;
            } else if is_left {
                seen_join = true;
            } else if field.hint.is_none() && !seen_join {
                field.hint = Some(word);
            } else {
                return Err(ParseError::new(
                    format!("Unexpected hint `!{word}`"),
                    span,
                    self.input,
                ));
            }
        }

        if seen_bang && !self.check(&TokenKind::LeftParen) {
            return Err(ParseError::unexpected(
                "embedded resource `(` after hint",
                &self.current().kind,
                self.current().span,
                self.input,
            ));
        }
        Ok(seen_bang)
    }

    /// Parses `'(' (node (',' node)*)? ')'`.
    fn parse_embedded_children(&mut self) -> Result<Vec<Node>, ParseError> {
        self.expect(&TokenKind::LeftParen, "`(`")?;
        if self.check(&TokenKind::RightParen) {
            self.advance();
            return Ok(vec![]);
        }
        let children = self.parse_node_list()?;
        self.expect(&TokenKind::RightParen, "`)`")?;
        Ok(children)
    }

    /// Parses `json_accessor? cast? aggregate? cast?`.
    fn parse_simple_tail(&mut self, field: &mut Field) -> Result<(), ParseError> {
        if self.check(&TokenKind::Arrow) || self.check(&TokenKind::DoubleArrow) {
            let mut keys = vec![];
            let mut text = false;
            while !text && (self.check(&TokenKind::Arrow) || self.check(&TokenKind::DoubleArrow)) {
                text = self.check(&TokenKind::DoubleArrow);
                self.advance();
                keys.push(self.expect_identifier("JSON key after `->`")?);
            }
            field.json_path = Some(JsonPath { keys, text });
        }

        field.cast = self.parse_optional_cast()?;

        if self.check(&TokenKind::Dot) {
            self.advance();
            let span = self.current().span;
            let name = self.expect_identifier("aggregate function after `.`")?;
            let function = AggregateFunction::from_name(&name).ok_or_else(|| {
                ParseError::new(
                    format!(
                        "Unknown aggregate function `{name}`: expected one of count, sum, avg, min, max"
                    ),
                    span,
                    self.input,
                )
            })?;
            self.expect(&TokenKind::LeftParen, "`()` after aggregate function")?;
            self.expect(&TokenKind::RightParen, "`)`")?;
            let cast = self.parse_optional_cast()?;
            field.aggregate = Some(Aggregate {
                function,
                cast,
                standalone: false,
            });
        }
        Ok(())
    }

    fn parse_optional_cast(&mut self) -> Result<Option<String>, ParseError> {
        if !self.check(&TokenKind::DoubleColon) {
            return Ok(None);
        }
        self.advance();
        Ok(Some(self.expect_identifier("type name after `::`")?))
    }

    // --- Helper methods ---

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    /// Advances to the next token. Never moves past the final token.
    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Checks if the current token matches the given kind.
    fn check(&self, kind: &TokenKind) -> bool {
        core::mem::discriminant(&self.current().kind) == core::mem::discriminant(kind)
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_identifier(&mut self, expected: &str) -> Result<String, ParseError> {
        match self.current().kind.identifier() {
            Some(name) => {
                let name = String::from(name);
                self.advance();
                Ok(name)
            }
            None => Err(self.unexpected(expected)),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.current();
        ParseError::unexpected(expected, &token.kind, token.span, self.input)
    }
}

/// Parses a select expression into its nodes.
///
/// # Errors
///
/// Returns a `ParseError` if the input is not a valid select expression.
pub fn parse(input: &str) -> Result<Vec<Node>, ParseError> {
    Parser::new(input).parse_select()
}

/// Removes whitespace outside double-quoted identifiers.
///
/// This is the normalization applied to select expressions before they are
/// sent to the gateway.
#[must_use]
pub fn clean_select(input: &str) -> String {
    let mut quoted = false;
    let mut cleaned = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_whitespace() && !quoted {
            continue;
        }
        if c == '"' {
            quoted = !quoted;
        }
        cleaned.push(c);
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(node: &Node) -> &Field {
        match node {
            Node::Field(field) => field,
            other => panic!("Expected field, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_fields() {
        let nodes = parse("id, name").unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(field(&nodes[0]).name, "id");
        assert_eq!(field(&nodes[1]).name, "name");
    }

    #[test]
    fn test_count_aggregate_before_bare_field() {
        let nodes = parse("count()").unwrap();
        let count = field(&nodes[0]);
        let aggregate = count.aggregate.as_ref().unwrap();
        assert!(aggregate.standalone);
        assert!(!count.is_embedding());

        let nodes = parse("count").unwrap();
        assert!(field(&nodes[0]).aggregate.is_none());
    }

    #[test]
    fn test_quoted_count_is_an_embedding() {
        let nodes = parse("\"count\"()").unwrap();
        let count = field(&nodes[0]);
        assert!(count.is_embedding());
        assert!(count.aggregate.is_none());
    }

    #[test]
    fn test_hint_then_inner() {
        let nodes = parse("users!author_id!inner(name)").unwrap();
        let users = field(&nodes[0]);
        assert_eq!(users.hint.as_deref(), Some("author_id"));
        assert!(users.inner_join);
    }

    #[test]
    fn test_left_is_a_no_op() {
        let nodes = parse("users!left(name)").unwrap();
        let users = field(&nodes[0]);
        assert_eq!(users.hint, None);
        assert!(!users.inner_join);
    }

    #[test]
    fn test_hint_after_join_is_rejected() {
        let err = parse("users!inner!author_id(name)").unwrap_err();
        assert_eq!(err.remainder, "author_id(name)");
    }

    #[test]
    fn test_hint_requires_embedding() {
        let err = parse("users!author_id, id").unwrap_err();
        assert_eq!(err.remainder, ", id");
    }

    #[test]
    fn test_cast_before_and_after_aggregate() {
        let nodes = parse("amount::int.sum()::text").unwrap();
        let amount = field(&nodes[0]);
        assert_eq!(amount.cast.as_deref(), Some("int"));
        let aggregate = amount.aggregate.as_ref().unwrap();
        assert_eq!(aggregate.function, AggregateFunction::Sum);
        assert_eq!(aggregate.cast.as_deref(), Some("text"));
    }

    #[test]
    fn test_text_accessor_ends_path() {
        let err = parse("data->>a->b").unwrap_err();
        assert_eq!(err.message, "Unexpected input");
        assert_eq!(err.remainder, "->b");
    }

    #[test]
    fn test_unknown_aggregate() {
        let err = parse("id.median()").unwrap_err();
        assert!(err.message.contains("median"));
        assert_eq!(err.remainder, "median()");
    }

    #[test]
    fn test_clean_select() {
        assert_eq!(
            clean_select(" id, \"first name\" ,\n posts ( title ) "),
            "id,\"first name\",posts(title)"
        );
    }
}
