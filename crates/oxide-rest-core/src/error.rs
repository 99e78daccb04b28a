//! Resolution error values.
//!
//! Only syntax errors abort a call. Every other failure is a [`ShapeError`]
//! stored at the output key where it happened, so sibling fields keep
//! resolving.

use serde::Serialize;

use crate::parser::ParseError;

/// The kind of a localized resolution failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeErrorKind {
    /// Two or more relationships match an embedding.
    AmbiguousRelationship,
    /// No relationship connects the two relations.
    RelationshipNotFound,
    /// A leaf names a column the relation does not have.
    UnknownColumn,
    /// The relation being selected from does not exist.
    UnknownRelation,
    /// A spread targets a to-many embedding.
    IllegalSpread,
    /// The same relationship is embedded twice under one key.
    DuplicateEmbedding,
}

/// One relationship that could satisfy an ambiguous embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Constraint name.
    pub foreign_key_name: String,
    /// Relation declaring the key.
    pub owner: String,
    /// Owning columns.
    pub columns: Vec<String>,
    /// Referenced relation.
    pub referenced_relation: String,
}

/// Structured detail attached to a [`ShapeError`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ErrorContext {
    /// Relation the failing node was resolved against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
    /// Target relation or column named by the node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Candidate relationships, for ambiguity errors.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<Candidate>,
    /// How to rewrite the select expression to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// A localized resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ShapeError {
    /// What went wrong.
    pub kind: ShapeErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Structured detail.
    pub context: ErrorContext,
}

impl ShapeError {
    /// Creates an error with an empty context.
    #[must_use]
    pub fn new(kind: ShapeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Sets the relation and target in the context.
    #[must_use]
    pub fn between(mut self, relation: &str, target: &str) -> Self {
        self.context.relation = Some(String::from(relation));
        self.context.target = Some(String::from(target));
        self
    }

    /// No relationship connects `relation` and `target`.
    #[must_use]
    pub fn relationship_not_found(relation: &str, target: &str) -> Self {
        Self::new(
            ShapeErrorKind::RelationshipNotFound,
            format!("Could not find a relationship between '{relation}' and '{target}'"),
        )
        .between(relation, target)
    }

    /// Several relationships between `relation` and `target` match.
    #[must_use]
    pub fn ambiguous(relation: &str, target: &str, candidates: Vec<Candidate>) -> Self {
        let options = candidates
            .iter()
            .map(|c| format!("'{target}!{}'", c.foreign_key_name))
            .collect::<Vec<_>>()
            .join(", ");
        let mut error = Self::new(
            ShapeErrorKind::AmbiguousRelationship,
            format!(
                "Could not embed because more than one relationship was found for '{relation}' and '{target}'"
            ),
        )
        .between(relation, target);
        error.context.hint = Some(format!(
            "Try changing '{target}' to one of the following: {options}, or hint a column with '{target}!<columnname>'"
        ));
        error.context.candidates = candidates;
        error
    }

    /// `column` is not a column of `relation`.
    #[must_use]
    pub fn unknown_column(relation: &str, column: &str) -> Self {
        Self::new(
            ShapeErrorKind::UnknownColumn,
            format!("column '{column}' does not exist on '{relation}'"),
        )
        .between(relation, column)
    }

    /// `relation` is not in the schema.
    #[must_use]
    pub fn unknown_relation(relation: &str) -> Self {
        let mut error = Self::new(
            ShapeErrorKind::UnknownRelation,
            format!("relation '{relation}' does not exist"),
        );
        error.context.target = Some(String::from(relation));
        error
    }

    /// A spread targets the to-many embedding `target`.
    #[must_use]
    pub fn illegal_spread(relation: &str, target: &str) -> Self {
        Self::new(
            ShapeErrorKind::IllegalSpread,
            format!(
                "'{target}' cannot be spread into '{relation}': only to-one relationships can be spread"
            ),
        )
        .between(relation, target)
    }

    /// `target` is embedded twice under the same key.
    #[must_use]
    pub fn duplicate_embedding(relation: &str, target: &str) -> Self {
        let mut error = Self::new(
            ShapeErrorKind::DuplicateEmbedding,
            format!("table '{target}' specified more than once"),
        )
        .between(relation, target);
        error.context.hint = Some(format!(
            "Alias one of the embeddings, e.g. 'other:{target}(...)', or hint the relationship"
        ));
        error
    }
}

/// Failure of a parse-and-build call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    /// The select expression is malformed.
    #[error("syntax error: {0}")]
    Parse(#[from] ParseError),

    /// The shape could not be built at all.
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Result type for parse-and-build calls.
pub type Result<T> = std::result::Result<T, SelectError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str) -> Candidate {
        Candidate {
            foreign_key_name: String::from(name),
            owner: String::from("messages"),
            columns: vec![String::from("author_id")],
            referenced_relation: String::from("users"),
        }
    }

    #[test]
    fn test_ambiguous_lists_hint_syntax() {
        let error = ShapeError::ambiguous(
            "messages",
            "users",
            vec![candidate("sender_fkey"), candidate("receiver_fkey")],
        );
        assert_eq!(error.kind, ShapeErrorKind::AmbiguousRelationship);
        assert_eq!(error.context.candidates.len(), 2);
        let hint = error.context.hint.unwrap();
        assert!(hint.contains("'users!sender_fkey'"));
        assert!(hint.contains("'users!receiver_fkey'"));
        assert!(hint.contains("users!<columnname>"));
    }

    #[test]
    fn test_serialized_form() {
        let error = ShapeError::unknown_column("users", "nope");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["kind"], "unknown_column");
        assert_eq!(json["context"]["relation"], "users");
        assert!(json["context"].get("candidates").is_none());
    }

    #[test]
    fn test_select_error_display() {
        let error: SelectError = ShapeError::unknown_relation("ghosts").into();
        assert_eq!(error.to_string(), "relation 'ghosts' does not exist");
    }
}
