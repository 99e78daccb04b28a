//! Abstract Syntax Tree (AST) types for select expressions.

mod node;

pub use node::{Aggregate, AggregateFunction, Field, JsonPath, Node};
