//! Mapping from PostgreSQL type names to value types.

use super::Schema;
use crate::shape::ValueType;

impl Schema {
    /// Returns the value type of a PostgreSQL type name.
    ///
    /// Enum names declared in the schema map to their labels; `_name` and
    /// `name[]` map to arrays of `name`.
    #[must_use]
    pub fn value_type(&self, data_type: &str) -> ValueType {
        let data_type = data_type.trim();
        if let Some(enum_type) = self.find_enum(data_type) {
            return ValueType::Enum(enum_type.values.clone());
        }
        if let Some(element) = data_type
            .strip_suffix("[]")
            .or_else(|| data_type.strip_prefix('_'))
        {
            return ValueType::Array(Box::new(self.value_type(element)));
        }
        scalar_type(data_type)
    }
}

fn scalar_type(data_type: &str) -> ValueType {
    match data_type.to_ascii_lowercase().as_str() {
        "bool" | "boolean" => ValueType::Boolean,
        "int2" | "int4" | "int8" | "float4" | "float8" | "numeric" | "smallint" | "integer"
        | "int" | "bigint" | "real" | "double precision" | "decimal" | "serial" | "bigserial"
        | "smallserial" | "money" | "oid" => ValueType::Number,
        "bytea" | "bpchar" | "char" | "character" | "varchar" | "character varying" | "date"
        | "text" | "citext" | "time" | "timetz" | "timestamp" | "timestamptz" | "uuid"
        | "vector" | "interval" | "inet" | "cidr" | "macaddr" | "name" | "tsvector" => {
            ValueType::String
        }
        "json" | "jsonb" => ValueType::Json,
        "void" => ValueType::Void,
        "record" => ValueType::Record,
        _ => ValueType::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        let schema = Schema::new();
        assert_eq!(schema.value_type("int8"), ValueType::Number);
        assert_eq!(schema.value_type("numeric"), ValueType::Number);
        assert_eq!(schema.value_type("timestamptz"), ValueType::String);
        assert_eq!(schema.value_type("uuid"), ValueType::String);
        assert_eq!(schema.value_type("bool"), ValueType::Boolean);
        assert_eq!(schema.value_type("jsonb"), ValueType::Json);
        assert_eq!(schema.value_type("record"), ValueType::Record);
        assert_eq!(schema.value_type("void"), ValueType::Void);
        assert_eq!(schema.value_type("geometry"), ValueType::Unknown);
    }

    #[test]
    fn test_arrays() {
        let schema = Schema::new();
        assert_eq!(
            schema.value_type("_int4"),
            ValueType::Array(Box::new(ValueType::Number))
        );
        assert_eq!(
            schema.value_type("text[]"),
            ValueType::Array(Box::new(ValueType::String))
        );
    }

    #[test]
    fn test_enums() {
        let schema = Schema::new().enum_type("user_status", &["ONLINE", "OFFLINE"]);
        assert_eq!(
            schema.value_type("user_status"),
            ValueType::Enum(vec![String::from("ONLINE"), String::from("OFFLINE")])
        );
        assert!(matches!(
            schema.value_type("_user_status"),
            ValueType::Array(inner) if matches!(*inner, ValueType::Enum(_))
        ));
    }
}
