//! Tests for the `#[derive(Relation)]` macro output.

use oxide_rest_core::schema::{RelationDef, RelationKind, Schema};
use oxide_rest_core::select_shape;
use oxide_rest_derive::Relation;

// =============================================================================
// Test: Default relation name (snake_case) and inferred column types
// =============================================================================

#[allow(dead_code)]
#[derive(Relation)]
#[relation(name = "users")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub age: Option<i32>,
    pub tags: Vec<String>,
    pub score: f64,
    pub active: bool,
}

#[test]
fn test_user_relation_name() {
    assert_eq!(User::RELATION_NAME, "users");
    assert_eq!(User::relation().kind, RelationKind::Table);
}

#[test]
fn test_user_columns() {
    assert_eq!(
        User::COLUMNS,
        &["id", "username", "age", "tags", "score", "active"]
    );
    let relation = User::relation();
    let types: Vec<&str> = relation
        .columns
        .iter()
        .map(|c| c.data_type.as_str())
        .collect();
    assert_eq!(types, vec!["int8", "text", "int4", "_text", "float8", "bool"]);
    assert!(relation.find_column("age").unwrap().nullable);
    assert!(!relation.find_column("id").unwrap().nullable);
}

// =============================================================================
// Test: Foreign keys, explicit types and renamed columns
// =============================================================================

#[allow(dead_code)]
#[derive(Relation)]
pub struct BlogPost {
    pub id: i64,
    #[references(relation = "users")]
    pub author_id: i64,
    #[column(name = "reviewer", nullable)]
    #[references(relation = "users", fkey = "posts_reviewer_fkey")]
    pub reviewer_id: i64,
    #[column(pg_type = "timestamptz")]
    pub published_at: Option<String>,
}

#[test]
fn test_blog_post_default_name() {
    assert_eq!(BlogPost::RELATION_NAME, "blog_post");
    assert_eq!(
        BlogPost::COLUMNS,
        &["id", "author_id", "reviewer", "published_at"]
    );
}

#[test]
fn test_blog_post_relationships() {
    let relation = BlogPost::relation();
    assert_eq!(relation.relationships.len(), 2);

    let author = &relation.relationships[0];
    assert_eq!(author.foreign_key_name, "blog_post_author_id_fkey");
    assert_eq!(author.columns, vec!["author_id"]);
    assert_eq!(author.referenced_relation, "users");
    assert_eq!(author.referenced_columns, vec!["id"]);
    assert!(!author.is_one_to_one);

    let reviewer = &relation.relationships[1];
    assert_eq!(reviewer.foreign_key_name, "posts_reviewer_fkey");
    assert_eq!(reviewer.columns, vec!["reviewer"]);
}

#[test]
fn test_blog_post_explicit_type() {
    let relation = BlogPost::relation();
    let published = relation.find_column("published_at").unwrap();
    assert_eq!(published.data_type, "timestamptz");
    assert!(published.nullable);
    assert!(relation.find_column("reviewer").unwrap().nullable);
}

// =============================================================================
// Test: Views and one-to-one keys
// =============================================================================

#[allow(dead_code)]
#[derive(Relation)]
#[relation(name = "user_profiles", view)]
pub struct Profile {
    #[references(relation = "users", column = "id", one_to_one)]
    pub user_id: i64,
    pub bio: Option<String>,
}

#[test]
fn test_profile_is_view() {
    let relation = Profile::relation();
    assert_eq!(relation.kind, RelationKind::View);
    assert!(relation.relationships[0].is_one_to_one);
}

// =============================================================================
// Test: Derived relations drive shapes
// =============================================================================

#[test]
fn test_derived_schema_shape() {
    let schema = Schema::new()
        .with::<User>()
        .with::<BlogPost>()
        .with::<Profile>();
    schema.validate().unwrap();

    let shape = select_shape(
        &schema,
        "users",
        "username, user_profiles(bio), writer:blog_post!author_id(id)",
    )
    .unwrap();
    assert_eq!(
        shape.to_string(),
        "{ username: string, user_profiles: { bio: string | null } | null, writer: Array<{ id: number }> }"
    );
}

#[test]
fn test_derived_ambiguity() {
    let schema = Schema::new().with::<User>().with::<BlogPost>();
    let shape = select_shape(&schema, "users", "blog_post(id)").unwrap();
    assert_eq!(shape.errors().len(), 1);
}
