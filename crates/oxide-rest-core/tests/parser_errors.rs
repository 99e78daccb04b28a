//! Tests for parser error cases.

mod common;
use common::*;

#[test]
fn error_empty_input() {
    let err = parse_err("");
    assert_eq!(err.message, "Empty select expression");
    let err = parse_err("   ");
    assert_eq!(err.message, "Empty select expression");
}

#[test]
fn error_trailing_comma() {
    let err = parse_err("id,");
    assert!(err.message.starts_with("Unexpected end of input"));
    assert_eq!(err.remainder, "");
}

#[test]
fn error_leading_comma() {
    let _ = parse_err(",id");
}

#[test]
fn error_unclosed_embedding() {
    let err = parse_err("messages(id");
    assert!(err.message.starts_with("Unexpected end of input"));
}

#[test]
fn error_unbalanced_close() {
    let err = parse_err("id)");
    assert_eq!(err.message, "Unexpected input");
    assert_eq!(err.remainder, ")");
    assert_eq!(err.span.start, 2);
}

#[test]
fn error_remainder_points_at_failure() {
    let err = parse_err("id, name, ::text");
    assert_eq!(err.remainder, "::text");
    assert_eq!(err.to_string(), format!("{} at `::text`", err.message));
}

#[test]
fn error_spread_on_column() {
    let err = parse_err("id,...name");
    assert_eq!(
        err.message,
        "A spread operation must be done on an embedded resource"
    );
    assert_eq!(err.remainder, "...name");
}

#[test]
fn error_hint_without_embedding() {
    let _ = parse_err("users!fkey");
    let _ = parse_err("users!inner");
}

#[test]
fn error_hint_missing_name() {
    let _ = parse_err("users!(id)");
}

#[test]
fn error_second_hint() {
    let err = parse_err("users!a!b(id)");
    assert_eq!(err.message, "Unexpected hint `!b`");
    assert_eq!(err.remainder, "b(id)");
}

#[test]
fn error_hint_after_join_modifier() {
    let err = parse_err("users!inner!fkey(id)");
    assert_eq!(err.message, "Unexpected hint `!fkey`");
}

#[test]
fn error_unknown_aggregate() {
    let err = parse_err("id.median()");
    assert!(err.message.starts_with("Unknown aggregate function `median`"));
    assert_eq!(err.remainder, "median()");
}

#[test]
fn error_aggregate_without_parens() {
    let _ = parse_err("id.sum");
}

#[test]
fn error_cast_without_type() {
    let err = parse_err("id::");
    assert!(err.message.contains("type name"));
}

#[test]
fn error_json_arrow_without_key() {
    let _ = parse_err("data->");
    let _ = parse_err("data->>a->b");
}

#[test]
fn error_lone_dash() {
    let _ = parse_err("data-foo");
}

#[test]
fn error_unterminated_quote() {
    let err = parse_err("id,\"name");
    assert_eq!(err.message, "Unterminated quoted identifier");
}

#[test]
fn error_alias_without_field() {
    let _ = parse_err("label:");
    let _ = parse_err("label:*");
}
