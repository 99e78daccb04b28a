#![allow(dead_code)]

use oxide_rest_core::ast::{Field, Node};
use oxide_rest_core::schema::{Relation, Relationship, Schema};
use oxide_rest_core::shape::{Shape, TypeInfo, select_shape};
use oxide_rest_core::{ParseError, Parser, ShapeError};

pub fn parse(select: &str) -> Vec<Node> {
    Parser::new(select)
        .parse_select()
        .unwrap_or_else(|e| panic!("Failed to parse: {select}\nError: {e:?}"))
}

pub fn parse_err(select: &str) -> ParseError {
    Parser::new(select)
        .parse_select()
        .expect_err(&format!("Expected parse error for: {select}"))
}

pub fn field(node: &Node) -> &Field {
    match node {
        Node::Field(field) => field,
        other => panic!("Expected a field, got {other:?}"),
    }
}

pub fn render(nodes: &[Node]) -> String {
    nodes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Verifies that rendering is a fixed point: the rendered form parses back
/// to the same nodes.
pub fn round_trip(select: &str) {
    let nodes1 = parse(select);
    let rendered1 = render(&nodes1);
    let nodes2 = parse(&rendered1);
    let rendered2 = render(&nodes2);
    assert_eq!(
        nodes1, nodes2,
        "Round-trip changed the AST.\n  Input:    {select}\n  Rendered: {rendered1}"
    );
    assert_eq!(
        rendered1, rendered2,
        "Round-trip failed.\n  Input:    {select}\n  First:    {rendered1}\n  Second:   {rendered2}"
    );
}

pub fn shape(schema: &Schema, root: &str, select: &str) -> Shape {
    select_shape(schema, root, select)
        .unwrap_or_else(|e| panic!("Failed to build shape for: {select}\nError: {e}"))
}

pub fn ok<'a>(shape: &'a Shape, key: &str) -> &'a TypeInfo {
    match shape.get(key) {
        Some(Ok(info)) => info,
        Some(Err(e)) => panic!("Expected `{key}` to resolve, got error: {e}"),
        None => panic!("Missing key `{key}` in {shape}"),
    }
}

pub fn err<'a>(shape: &'a Shape, key: &str) -> &'a ShapeError {
    match shape.get(key) {
        Some(Err(e)) => e,
        Some(Ok(info)) => panic!("Expected `{key}` to fail, got {info}"),
        None => panic!("Missing key `{key}` in {shape}"),
    }
}

/// A chat schema:
///
/// - `users(username)`, with a `user_status` enum column
/// - `channels(id, slug)`
/// - `messages(id, message, data, username -> users, channel_id -> channels)`
/// - `channel_details(id -> channels, one-to-one, details)`
/// - `best_friends(first_user -> users, second_user -> users)`
/// - `employees(id, manager_id -> employees)`
pub fn chat_schema() -> Schema {
    Schema::new()
        .enum_type("user_status", &["ONLINE", "OFFLINE"])
        .relation(
            Relation::table("users")
                .column("username", "text")
                .nullable_column("status", "user_status")
                .nullable_column("age_range", "int4range")
                .nullable_column("catchphrase", "tsvector"),
        )
        .relation(
            Relation::table("channels")
                .column("id", "int8")
                .nullable_column("slug", "text")
                .nullable_column("data", "jsonb")
                .column("tags", "_text"),
        )
        .relation(
            Relation::table("messages")
                .column("id", "int8")
                .nullable_column("message", "text")
                .nullable_column("data", "jsonb")
                .column("username", "text")
                .column("channel_id", "int8")
                .relationship(Relationship::new(
                    "messages_username_fkey",
                    &["username"],
                    "users",
                    &["username"],
                ))
                .relationship(Relationship::new(
                    "messages_channel_id_fkey",
                    &["channel_id"],
                    "channels",
                    &["id"],
                )),
        )
        .relation(
            Relation::table("channel_details")
                .column("id", "int8")
                .nullable_column("details", "text")
                .relationship(
                    Relationship::new("channel_details_id_fkey", &["id"], "channels", &["id"])
                        .one_to_one(),
                ),
        )
        .relation(
            Relation::table("best_friends")
                .column("id", "int8")
                .column("first_user", "text")
                .nullable_column("second_user", "text")
                .relationship(Relationship::new(
                    "best_friends_first_user_fkey",
                    &["first_user"],
                    "users",
                    &["username"],
                ))
                .relationship(Relationship::new(
                    "best_friends_second_user_fkey",
                    &["second_user"],
                    "users",
                    &["username"],
                )),
        )
        .relation(
            Relation::table("employees")
                .column("id", "int8")
                .column("name", "text")
                .nullable_column("manager_id", "int8")
                .relationship(Relationship::new(
                    "employees_manager_id_fkey",
                    &["manager_id"],
                    "employees",
                    &["id"],
                )),
        )
}
