//! # oxide-rest-core
//!
//! Select-expression parser and relationship resolver for REST-over-SQL
//! gateways.
//!
//! This crate provides:
//! - A hand-written lexer and recursive descent parser for the select
//!   language (`id, author:users!author_id(name), ...profiles(bio)`)
//! - A schema model of relations, columns and foreign keys
//! - A resolver that picks the foreign key behind every embedding, with
//!   hint-based disambiguation
//! - A shape builder that composes the nested result type, keeping
//!   resolution errors at the key where they occur
//!
//! ## Example
//!
//! ```rust
//! use oxide_rest_core::schema::{Relation, Relationship, Schema};
//! use oxide_rest_core::shape::select_shape;
//!
//! let schema = Schema::new()
//!     .relation(Relation::table("users").column("username", "text"))
//!     .relation(
//!         Relation::table("messages")
//!             .column("id", "int8")
//!             .column("username", "text")
//!             .relationship(Relationship::new(
//!                 "messages_username_fkey",
//!                 &["username"],
//!                 "users",
//!                 &["username"],
//!             )),
//!     );
//!
//! let shape = select_shape(&schema, "users", "username, messages(id)").unwrap();
//! assert_eq!(
//!     shape.to_string(),
//!     "{ username: string, messages: Array<{ id: number }> }"
//! );
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod schema;
pub mod shape;

pub use ast::{Field, Node};
pub use error::{SelectError, ShapeError, ShapeErrorKind};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{ParseError, Parser, parse};
pub use resolver::{Direction, MatchKind, ResolvedRelationship, resolve};
pub use schema::{Column, Relation, RelationDef, Relationship, Schema};
pub use shape::{Shape, ShapeBuilder, TypeInfo, ValueType, select_shape};
