//! Shape tree types.

use core::fmt;

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::error::ShapeError;
use crate::lexer::is_identifier_char;

/// Logical type of a value in a result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "of", rename_all = "lowercase")]
pub enum ValueType {
    Number,
    String,
    Boolean,
    /// Arbitrary JSON.
    Json,
    /// A composite row of unknown structure.
    Record,
    /// No value (functions returning `void`).
    Void,
    /// A type the mapping does not know.
    Unknown,
    /// One of a fixed set of string labels.
    Enum(Vec<String>),
    Array(Box<ValueType>),
    /// A nested object, from an embedding.
    Object(Shape),
}

/// A value type with its nullability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeInfo {
    /// The value type.
    #[serde(flatten)]
    pub value: ValueType,
    /// Whether the value can be null.
    pub nullable: bool,
}

impl TypeInfo {
    /// A non-null value of the given type.
    #[must_use]
    pub const fn required(value: ValueType) -> Self {
        Self {
            value,
            nullable: false,
        }
    }

    /// A nullable value of the given type.
    #[must_use]
    pub const fn nullable(value: ValueType) -> Self {
        Self {
            value,
            nullable: true,
        }
    }
}

/// One key of a shape: its type, or the error that prevented resolving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeField {
    /// Output key.
    pub key: String,
    /// Resolved type or localized error.
    pub value: Result<TypeInfo, ShapeError>,
}

impl Serialize for ShapeField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.value {
            Ok(info) => info.serialize(serializer),
            Err(error) => {
                let mut state = serializer.serialize_struct("ShapeField", 1)?;
                state.serialize_field("error", error)?;
                state.end()
            }
        }
    }
}

/// The resolved structure of a result row.
///
/// Keys keep the order of first appearance. Inserting an existing key
/// replaces its value in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Shape {
    fields: Vec<ShapeField>,
}

impl Shape {
    /// Creates an empty shape.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: vec![] }
    }

    /// Inserts or replaces a key.
    pub fn insert(&mut self, key: impl Into<String>, value: Result<TypeInfo, ShapeError>) {
        let key = key.into();
        if let Some(existing) = self.fields.iter_mut().find(|f| f.key == key) {
            existing.value = value;
        } else {
            self.fields.push(ShapeField { key, value });
        }
    }

    /// Inserts every key of `other`, replacing existing ones.
    pub fn merge(&mut self, other: Self) {
        for field in other.fields {
            self.insert(field.key, field.value);
        }
    }

    /// Marks every resolved field nullable.
    #[must_use]
    pub fn into_nullable(mut self) -> Self {
        for field in &mut self.fields {
            if let Ok(info) = &mut field.value {
                info.nullable = true;
            }
        }
        self
    }

    /// Looks up a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Result<TypeInfo, ShapeError>> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    /// Returns true if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.key.as_str())
    }

    /// Fields in order.
    #[must_use]
    pub fn fields(&self) -> &[ShapeField] {
        &self.fields
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the shape has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Every error in the tree with its dotted key path.
    #[must_use]
    pub fn errors(&self) -> Vec<(String, &ShapeError)> {
        let mut errors = vec![];
        self.collect_errors("", &mut errors);
        errors
    }

    fn collect_errors<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a ShapeError)>) {
        for field in &self.fields {
            let path = if prefix.is_empty() {
                field.key.clone()
            } else {
                format!("{prefix}.{}", field.key)
            };
            match &field.value {
                Err(error) => out.push((path, error)),
                Ok(info) => {
                    if let Some(nested) = info.value.object() {
                        nested.collect_errors(&path, out);
                    }
                }
            }
        }
    }
}

impl ValueType {
    /// Returns the object shape of an embedding, looking through arrays.
    #[must_use]
    pub fn object(&self) -> Option<&Shape> {
        match self {
            Self::Object(shape) => Some(shape),
            Self::Array(inner) => inner.object(),
            _ => None,
        }
    }
}

impl Serialize for Shape {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.key, field)?;
        }
        map.end()
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number => f.write_str("number"),
            Self::String => f.write_str("string"),
            Self::Boolean => f.write_str("boolean"),
            Self::Json => f.write_str("Json"),
            Self::Record => f.write_str("Record<string, unknown>"),
            Self::Void => f.write_str("undefined"),
            Self::Unknown => f.write_str("unknown"),
            Self::Enum(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{value:?}")?;
                }
                Ok(())
            }
            Self::Array(inner) => write!(f, "Array<{inner}>"),
            Self::Object(shape) => write!(f, "{shape}"),
        }
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        if self.nullable {
            f.write_str(" | null")?;
        }
        Ok(())
    }
}

/// Renders the shape in TypeScript object-type notation, e.g.
/// `{ id: number, author: { name: string } | null }`. Errors render as
/// `error("...")`.
impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return f.write_str("{}");
        }
        f.write_str("{ ")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if field.key.chars().all(is_identifier_char) && !field.key.is_empty() {
                f.write_str(&field.key)?;
            } else {
                write!(f, "{:?}", field.key)?;
            }
            f.write_str(": ")?;
            match &field.value {
                Ok(info) => write!(f, "{info}")?,
                Err(error) => write!(f, "error({:?})", error.message)?,
            }
        }
        f.write_str(" }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut shape = Shape::new();
        shape.insert("a", Ok(TypeInfo::required(ValueType::Number)));
        shape.insert("b", Ok(TypeInfo::required(ValueType::String)));
        shape.insert("a", Ok(TypeInfo::nullable(ValueType::Boolean)));
        assert_eq!(shape.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(shape.to_string(), "{ a: boolean | null, b: string }");
    }

    #[test]
    fn test_display_nested() {
        let mut inner = Shape::new();
        inner.insert("id", Ok(TypeInfo::required(ValueType::Number)));
        let mut shape = Shape::new();
        shape.insert(
            "posts",
            Ok(TypeInfo::required(ValueType::Array(Box::new(
                ValueType::Object(inner),
            )))),
        );
        shape.insert(
            "status",
            Ok(TypeInfo::nullable(ValueType::Enum(vec![
                String::from("A"),
                String::from("B"),
            ]))),
        );
        assert_eq!(
            shape.to_string(),
            "{ posts: Array<{ id: number }>, status: \"A\" | \"B\" | null }"
        );
    }

    #[test]
    fn test_errors_carry_paths() {
        let mut inner = Shape::new();
        inner.insert("nope", Err(ShapeError::unknown_column("users", "nope")));
        let mut shape = Shape::new();
        shape.insert(
            "author",
            Ok(TypeInfo::nullable(ValueType::Object(inner))),
        );
        let errors = shape.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, "author.nope");
    }

    #[test]
    fn test_serialize() {
        let mut shape = Shape::new();
        shape.insert("id", Ok(TypeInfo::required(ValueType::Number)));
        shape.insert(
            "tags",
            Ok(TypeInfo::nullable(ValueType::Array(Box::new(ValueType::String)))),
        );
        shape.insert("x", Err(ShapeError::unknown_column("t", "x")));
        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(json["id"], serde_json::json!({"type": "number", "nullable": false}));
        assert_eq!(
            json["tags"],
            serde_json::json!({"type": "array", "of": {"type": "string"}, "nullable": true})
        );
        assert_eq!(json["x"]["error"]["kind"], "unknown_column");
    }
}
