//! Tests for read requests.

mod common;
use common::*;

use oxide_rest::{BuildError, Client, ClientConfig, Count, Method, SelectOptions};
use oxide_rest_core::schema::{Relation, Relationship, Schema};

#[test]
fn select_builds_get() {
    let request = build(client().from("users").select("id,name"));
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.url.as_str(), "http://localhost:3000/users?select=id%2Cname");
    assert!(request.body.is_none());
    assert!(request.header("Prefer").is_none());
}

#[test]
fn select_cleans_whitespace() {
    let request = build(
        client()
            .from("users")
            .select(" id,\n  author:users ( \"full name\" ) "),
    );
    assert_eq!(param(&request, "select"), "id,author:users(\"full name\")");
}

#[test]
fn select_rejects_malformed_expression() {
    let err = build_err(client().from("users").select("id,messages(id"));
    assert!(matches!(err, BuildError::Select(_)));
    assert!(err.to_string().starts_with("invalid select expression"));
}

#[test]
fn select_head_with_count() {
    let request = build(client().from("users").select_with(
        "*",
        SelectOptions {
            head: true,
            count: Some(Count::Exact),
        },
    ));
    assert_eq!(request.method, Method::Head);
    assert_eq!(request.header("Prefer"), Some("count=exact"));
}

#[test]
fn select_under_base_path() {
    let client = Client::new("https://example.com/rest/v1").unwrap();
    let request = build(client.from("users").select("*"));
    assert_eq!(request.url.path(), "/rest/v1/users");

    let client = Client::new("https://example.com/rest/v1/").unwrap();
    let request = build(client.from("users").select("*"));
    assert_eq!(request.url.path(), "/rest/v1/users");
}

#[test]
fn select_relation_is_path_encoded() {
    let request = build(client().from("my table").select("*"));
    assert_eq!(request.url.path(), "/my%20table");
}

#[test]
fn select_schema_uses_accept_profile() {
    let request = build(client().schema("private").from("users").select("*"));
    assert_eq!(request.header("Accept-Profile"), Some("private"));
    assert!(request.header("Content-Profile").is_none());
}

#[test]
fn select_sends_default_headers() {
    let config = ClientConfig {
        url: String::from(BASE_URL),
        schema: Some(String::from("api")),
        headers: [(String::from("apikey"), String::from("secret"))]
            .into_iter()
            .collect(),
    };
    let client = Client::from_config(config).unwrap();
    let request = build(client.from("users").select("*"));
    assert_eq!(request.header("apikey"), Some("secret"));
    assert_eq!(request.header("Accept-Profile"), Some("api"));
}

#[test]
fn select_reports_shape() {
    let schema = Schema::new()
        .relation(Relation::table("users").column("username", "text"))
        .relation(
            Relation::table("messages")
                .column("id", "int8")
                .column("username", "text")
                .relationship(Relationship::new(
                    "messages_username_fkey",
                    &["username"],
                    "users",
                    &["username"],
                )),
        );
    let builder = client().from("users").select("username, messages(id)");
    let shape = builder.shape(&schema).unwrap();
    assert_eq!(
        shape.to_string(),
        "{ username: string, messages: Array<{ id: number }> }"
    );
}
