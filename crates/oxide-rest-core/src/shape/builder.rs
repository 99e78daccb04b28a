//! Shape composition over the AST.

use tracing::trace;

use super::{Shape, TypeInfo, ValueType};
use crate::ast::{Field, Node};
use crate::error::{SelectError, ShapeError};
use crate::parser::parse;
use crate::resolver::{Cardinality, ResolvedRelationship, resolve};
use crate::schema::{Column, Relation, Schema, SchemaIndex};

/// Builds result shapes for select expressions against one schema.
///
/// The index is built once and reused for every node of every call.
pub struct ShapeBuilder<'s> {
    index: SchemaIndex<'s>,
}

/// An embedding that resolved, with its composed child shape.
struct Embedded<'s> {
    resolved: ResolvedRelationship<'s>,
    cardinality: Cardinality,
    info: TypeInfo,
}

impl<'s> ShapeBuilder<'s> {
    /// Creates a builder over `schema`.
    #[must_use]
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            index: SchemaIndex::new(schema),
        }
    }

    /// Returns the schema index.
    #[must_use]
    pub const fn index(&self) -> &SchemaIndex<'s> {
        &self.index
    }

    /// Builds the shape of `nodes` selected from `root`.
    ///
    /// # Errors
    ///
    /// Fails only when `root` is not a relation of the schema. Every other
    /// problem is stored in the shape at the key where it occurs.
    pub fn build(&self, root: &str, nodes: &[Node]) -> Result<Shape, ShapeError> {
        let relation = self
            .index
            .relation(root)
            .ok_or_else(|| ShapeError::unknown_relation(root))?;
        Ok(self.build_level(relation, nodes))
    }

    fn build_level(&self, relation: &'s Relation, nodes: &[Node]) -> Shape {
        let mut shape = Shape::new();
        let mut embedded: Vec<(String, ResolvedRelationship<'s>)> = vec![];

        for node in nodes {
            match node {
                Node::Star => {
                    for column in &relation.columns {
                        shape.insert(column.name.clone(), Ok(self.column_type(column)));
                    }
                }
                Node::Field(field) if field.is_embedding() => {
                    let key = field.output_name();
                    match self.embed(relation, field) {
                        Err(error) => shape.insert(key, Err(error)),
                        Ok(embedding) => {
                            let duplicate = field.hint.is_none()
                                && embedded
                                    .iter()
                                    .any(|(k, r)| k == key && r.same_as(&embedding.resolved));
                            if duplicate {
                                shape.insert(
                                    key,
                                    Err(ShapeError::duplicate_embedding(
                                        &relation.name,
                                        embedding.resolved.to_relation,
                                    )),
                                );
                            } else if !field.children.is_empty() {
                                shape.insert(key, Ok(embedding.info));
                            }
                            embedded.push((String::from(key), embedding.resolved));
                        }
                    }
                }
                Node::Field(field) => {
                    trace!(relation = %relation.name, field = %field.name, "leaf field");
                    shape.insert(field.output_name(), self.leaf_type(relation, field));
                }
                Node::Spread { target } => {
                    let key = target.output_name();
                    match self.embed(relation, target) {
                        Err(error) => shape.insert(key, Err(error)),
                        Ok(embedding) if embedding.cardinality == Cardinality::Many => {
                            shape.insert(
                                key,
                                Err(ShapeError::illegal_spread(
                                    &relation.name,
                                    embedding.resolved.to_relation,
                                )),
                            );
                        }
                        Ok(embedding) => {
                            if let ValueType::Object(child) = embedding.info.value {
                                // A missing related row nulls every spliced column.
                                if embedding.info.nullable {
                                    shape.merge(child.into_nullable());
                                } else {
                                    shape.merge(child);
                                }
                            }
                        }
                    }
                }
            }
        }
        shape
    }

    /// Resolves an embedding and composes its child shape.
    fn embed(&self, relation: &'s Relation, field: &Field) -> Result<Embedded<'s>, ShapeError> {
        let resolved = resolve(&self.index, &relation.name, field)?;
        let target = self
            .index
            .relation(resolved.to_relation)
            .ok_or_else(|| ShapeError::unknown_relation(resolved.to_relation))?;

        trace!(from = %relation.name, to = %target.name, "embedding");
        let child = self.build_level(target, &field.children);
        let (cardinality, nullable) = resolved.cardinality(&self.index, field.inner_join);
        let info = match cardinality {
            Cardinality::Many => {
                TypeInfo::required(ValueType::Array(Box::new(ValueType::Object(child))))
            }
            Cardinality::One => TypeInfo {
                value: ValueType::Object(child),
                nullable,
            },
        };
        Ok(Embedded {
            resolved,
            cardinality,
            info,
        })
    }

    fn column_type(&self, column: &Column) -> TypeInfo {
        TypeInfo {
            value: self.index.schema().value_type(&column.data_type),
            nullable: column.nullable,
        }
    }

    /// Types a leaf field: a column, JSON path, cast, or aggregate.
    fn leaf_type(&self, relation: &Relation, field: &Field) -> Result<TypeInfo, ShapeError> {
        let schema = self.index.schema();
        let column = relation.find_column(&field.name);

        if let Some(aggregate) = &field.aggregate {
            if !aggregate.standalone && column.is_none() && field.name != "count" {
                return Err(ShapeError::unknown_column(&relation.name, &field.name));
            }
            let value = aggregate
                .cast
                .as_deref()
                .map_or(ValueType::Number, |cast| schema.value_type(cast));
            return Ok(TypeInfo::required(value));
        }

        let mut info = match column {
            Some(column) => self.column_type(column),
            // A bare `count` is always accepted by the gateway.
            None if field.name == "count" => TypeInfo::required(ValueType::Number),
            None => return Err(ShapeError::unknown_column(&relation.name, &field.name)),
        };

        if let Some(path) = &field.json_path {
            info = TypeInfo::nullable(if path.text {
                ValueType::String
            } else {
                ValueType::Json
            });
        }
        if let Some(cast) = &field.cast {
            info.value = schema.value_type(cast);
        }
        Ok(info)
    }
}

/// Builds the shape of `nodes` selected from `root`.
///
/// # Errors
///
/// Fails only when `root` is not a relation of the schema.
pub fn build(schema: &Schema, root: &str, nodes: &[Node]) -> Result<Shape, ShapeError> {
    ShapeBuilder::new(schema).build(root, nodes)
}

/// Parses `select` and builds its shape against `root`.
///
/// # Errors
///
/// Returns `SelectError::Parse` for a malformed expression and
/// `SelectError::Shape` when `root` is not a relation of the schema.
pub fn select_shape(schema: &Schema, root: &str, select: &str) -> Result<Shape, SelectError> {
    let nodes = parse(select)?;
    Ok(build(schema, root, &nodes)?)
}
