//! Tests for loading schema snapshots.

use oxide_rest_core::schema::{Schema, SchemaError};
use oxide_rest_core::select_shape;

const SNAPSHOT: &str = r#"{
    "relations": [
        {
            "name": "countries",
            "columns": [
                {"name": "id", "type": "int8"},
                {"name": "name", "type": "text"},
                {"name": "continent", "type": "continents", "isNullable": true}
            ]
        },
        {
            "name": "cities",
            "columns": [
                {"name": "id", "type": "int8"},
                {"name": "name", "type": "text"},
                {"name": "country_id", "type": "int8", "isNullable": true}
            ],
            "relationships": [{
                "foreignKeyName": "cities_country_id_fkey",
                "columns": ["country_id"],
                "referencedRelation": "countries",
                "referencedColumns": ["id"]
            }]
        }
    ],
    "enums": [
        {"name": "continents", "values": ["Africa", "Asia", "Europe"]}
    ]
}"#;

#[test]
fn snapshot_from_str() {
    let schema = Schema::from_json_str(SNAPSHOT).unwrap();
    let shape = select_shape(&schema, "cities", "name, countries(name, continent)").unwrap();
    assert_eq!(
        shape.to_string(),
        "{ name: string, countries: { name: string, continent: \"Africa\" | \"Asia\" | \"Europe\" | null } | null }"
    );
}

#[test]
fn snapshot_from_reader() {
    let schema = Schema::from_reader(SNAPSHOT.as_bytes()).unwrap();
    assert_eq!(schema.relations.len(), 2);
    let shape = select_shape(&schema, "countries", "name, cities(name)").unwrap();
    assert_eq!(
        shape.to_string(),
        "{ name: string, cities: Array<{ name: string }> }"
    );
}

#[test]
fn snapshot_rejects_mismatched_columns() {
    let json = r#"{
        "relations": [{
            "name": "cities",
            "columns": [{"name": "country_id", "type": "int8"}],
            "relationships": [{
                "foreignKeyName": "cities_country_id_fkey",
                "columns": ["country_id"],
                "referencedRelation": "countries",
                "referencedColumns": ["id", "code"]
            }]
        }]
    }"#;
    assert!(matches!(
        Schema::from_json_str(json),
        Err(SchemaError::ColumnCountMismatch(name)) if name == "cities_country_id_fkey"
    ));
}

#[test]
fn snapshot_error_display() {
    let err = Schema::from_json_str("not json").unwrap_err();
    assert!(err.to_string().starts_with("invalid schema snapshot"));
}
