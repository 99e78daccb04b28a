//! Schema model: relations, columns and foreign-key relationships.
//!
//! The schema is supplied by the caller and never mutated during
//! resolution. It can be built in code, deserialized from a JSON snapshot,
//! or declared with `#[derive(Relation)]` from `oxide-rest-derive`.

mod index;
mod types;

use serde::{Deserialize, Serialize};

pub use index::{Edge, SchemaIndex};

/// Errors raised while loading or validating a schema snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The snapshot is not valid JSON for the schema model.
    #[error("invalid schema snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Two relations share a name.
    #[error("relation '{0}' is declared more than once")]
    DuplicateRelation(String),

    /// A relationship names a column its owner does not have.
    #[error("relationship '{foreign_key}' on '{relation}' uses unknown column '{column}'")]
    UnknownColumn {
        /// The owning relation.
        relation: String,
        /// The foreign key constraint.
        foreign_key: String,
        /// The missing column.
        column: String,
    },

    /// Owning and referenced column lists differ in length.
    #[error("relationship '{0}' has mismatched column lists")]
    ColumnCountMismatch(String),
}

/// Whether a relation is a table or a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    #[default]
    Table,
    View,
}

/// A column of a relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// PostgreSQL type name (`int8`, `text`, `_int4`, an enum name, ...).
    #[serde(rename = "type")]
    pub data_type: String,
    /// Whether the column accepts NULL.
    #[serde(default, rename = "isNullable")]
    pub nullable: bool,
}

impl Column {
    /// Creates a non-nullable column.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: false,
        }
    }

    /// Marks the column as nullable.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// A foreign key, declared once on the relation that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// Constraint name.
    pub foreign_key_name: String,
    /// Owning columns.
    pub columns: Vec<String>,
    /// The relation the key points at.
    pub referenced_relation: String,
    /// Referenced columns, in the same order as `columns`.
    pub referenced_columns: Vec<String>,
    /// True when the owning columns are also unique.
    #[serde(default)]
    pub is_one_to_one: bool,
}

impl Relationship {
    /// Creates a many-to-one relationship.
    #[must_use]
    pub fn new(
        foreign_key_name: impl Into<String>,
        columns: &[&str],
        referenced_relation: impl Into<String>,
        referenced_columns: &[&str],
    ) -> Self {
        Self {
            foreign_key_name: foreign_key_name.into(),
            columns: columns.iter().map(|c| String::from(*c)).collect(),
            referenced_relation: referenced_relation.into(),
            referenced_columns: referenced_columns.iter().map(|c| String::from(*c)).collect(),
            is_one_to_one: false,
        }
    }

    /// Marks the relationship as one-to-one.
    #[must_use]
    pub const fn one_to_one(mut self) -> Self {
        self.is_one_to_one = true;
        self
    }

    /// Returns true when the key consists of exactly the given column.
    #[must_use]
    pub fn is_single_column(&self, column: &str) -> bool {
        matches!(self.columns.as_slice(), [only] if only == column)
    }
}

/// A table or view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Relation name.
    pub name: String,
    /// Table or view.
    #[serde(default)]
    pub kind: RelationKind,
    /// Columns in declaration order.
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Foreign keys owned by this relation.
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl Relation {
    /// Creates an empty table.
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: RelationKind::Table,
            columns: vec![],
            relationships: vec![],
        }
    }

    /// Creates an empty view.
    #[must_use]
    pub fn view(name: impl Into<String>) -> Self {
        Self {
            kind: RelationKind::View,
            ..Self::table(name)
        }
    }

    /// Adds a non-nullable column.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>, data_type: impl Into<String>) -> Self {
        self.columns.push(Column::new(name, data_type));
        self
    }

    /// Adds a nullable column.
    #[must_use]
    pub fn nullable_column(
        mut self,
        name: impl Into<String>,
        data_type: impl Into<String>,
    ) -> Self {
        self.columns.push(Column::new(name, data_type).nullable());
        self
    }

    /// Adds a foreign key owned by this relation.
    #[must_use]
    pub fn relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A user-defined enum type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    /// Type name as used in column types.
    pub name: String,
    /// Allowed labels.
    pub values: Vec<String>,
}

/// Declares a relation from a Rust type.
///
/// Implemented by `#[derive(Relation)]`.
pub trait RelationDef {
    /// Returns the relation metadata.
    fn relation() -> Relation;
}

/// A schema snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Tables and views.
    #[serde(default)]
    pub relations: Vec<Relation>,
    /// Enum types used by columns.
    #[serde(default)]
    pub enums: Vec<EnumType>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a relation.
    #[must_use]
    pub fn relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    /// Adds the relation declared by `T`.
    #[must_use]
    pub fn with<T: RelationDef>(self) -> Self {
        self.relation(T::relation())
    }

    /// Adds an enum type.
    #[must_use]
    pub fn enum_type(mut self, name: impl Into<String>, values: &[&str]) -> Self {
        self.enums.push(EnumType {
            name: name.into(),
            values: values.iter().map(|v| String::from(*v)).collect(),
        });
        self
    }

    /// Looks up a relation by name.
    #[must_use]
    pub fn find_relation(&self, name: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Looks up an enum type by name.
    #[must_use]
    pub fn find_enum(&self, name: &str) -> Option<&EnumType> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Parses and validates a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if the JSON is malformed or the snapshot is
    /// inconsistent.
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let schema: Self = serde_json::from_str(json)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Reads and validates a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if reading fails, the JSON is malformed, or the
    /// snapshot is inconsistent.
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, SchemaError> {
        let schema: Self = serde_json::from_reader(reader)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Checks relation names are unique and every relationship refers to
    /// columns its owner has.
    ///
    /// Referenced relations are not required to exist: snapshots often
    /// cover a single exposed schema.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (i, relation) in self.relations.iter().enumerate() {
            if self.relations[..i].iter().any(|r| r.name == relation.name) {
                return Err(SchemaError::DuplicateRelation(relation.name.clone()));
            }
            for relationship in &relation.relationships {
                if relationship.columns.len() != relationship.referenced_columns.len() {
                    return Err(SchemaError::ColumnCountMismatch(
                        relationship.foreign_key_name.clone(),
                    ));
                }
                for column in &relationship.columns {
                    if relation.find_column(column).is_none() {
                        return Err(SchemaError::UnknownColumn {
                            relation: relation.name.clone(),
                            foreign_key: relationship.foreign_key_name.clone(),
                            column: column.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
