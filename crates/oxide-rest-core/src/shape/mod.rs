//! Result shapes.
//!
//! A [`Shape`] describes the object a select expression returns: its keys,
//! their value types and nullability, and nested objects for embeddings.
//! Resolution failures other than syntax errors are stored as values at the
//! key where they happen.

mod builder;
mod types;

pub use builder::{ShapeBuilder, build, select_shape};
pub use types::{Shape, ShapeField, TypeInfo, ValueType};
