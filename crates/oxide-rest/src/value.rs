//! Filter values and their wire representation.
//!
//! Filter operands travel inside query parameters as `operator.value`. This
//! module turns Rust values into that text and applies the quoting rules
//! for lists.

use serde_json::Value;

/// Characters with meaning inside `(...)` and `{...}` lists.
const RESERVED: [char; 3] = [',', '(', ')'];

/// Trait for types usable as filter operands.
pub trait ToFilterValue {
    /// Returns the operand text.
    fn to_filter_value(&self) -> String;
}

impl ToFilterValue for str {
    fn to_filter_value(&self) -> String {
        String::from(self)
    }
}

impl ToFilterValue for String {
    fn to_filter_value(&self) -> String {
        self.clone()
    }
}

impl ToFilterValue for bool {
    fn to_filter_value(&self) -> String {
        self.to_string()
    }
}

impl ToFilterValue for i32 {
    fn to_filter_value(&self) -> String {
        self.to_string()
    }
}

impl ToFilterValue for i64 {
    fn to_filter_value(&self) -> String {
        self.to_string()
    }
}

impl ToFilterValue for u64 {
    fn to_filter_value(&self) -> String {
        self.to_string()
    }
}

impl ToFilterValue for f64 {
    fn to_filter_value(&self) -> String {
        self.to_string()
    }
}

impl ToFilterValue for Value {
    fn to_filter_value(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Null => String::from("null"),
            other => other.to_string(),
        }
    }
}

impl<T: ToFilterValue + ?Sized> ToFilterValue for &T {
    fn to_filter_value(&self) -> String {
        (**self).to_filter_value()
    }
}

/// Renders a list operand as `(a,b,...)`, quoting reserved items.
pub(crate) fn in_list<T: ToFilterValue>(values: &[T]) -> String {
    let items: Vec<String> = values
        .iter()
        .map(|v| quote_reserved(&v.to_filter_value()))
        .collect();
    format!("({})", items.join(","))
}

/// Renders a PostgreSQL array literal `{a,b,...}`.
pub(crate) fn array_literal<T: ToFilterValue>(values: &[T]) -> String {
    let items: Vec<String> = values.iter().map(ToFilterValue::to_filter_value).collect();
    format!("{{{}}}", items.join(","))
}

/// Renders an operand of `cs`, `cd` and `ov`: strings pass through,
/// arrays become array literals, objects stay JSON.
pub(crate) fn container(value: &Value) -> String {
    match value {
        Value::Array(items) => array_literal(items),
        other => other.to_filter_value(),
    }
}

fn quote_reserved(value: &str) -> String {
    if value.contains(RESERVED) {
        format!("\"{value}\"")
    } else {
        String::from(value)
    }
}
