//! Row filters and request finalization.
//!
//! Every filter becomes one query parameter, `column=operator.value`, in
//! the order the methods are called. The builder is finalized with
//! [`FilterBuilder::build`].

use std::collections::BTreeMap;
use std::marker::PhantomData;

use oxide_rest_core::parser::clean_select;
use oxide_rest_core::schema::Schema;
use oxide_rest_core::{SelectError, Shape, parse, select_shape};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{BuildError, Result};
use crate::query::Count;
use crate::request::{Method, Request, ResponseKind};
use crate::value::{ToFilterValue, array_literal, container, in_list};

// Typestate markers (zero-sized types)

/// Marker: a `GET` or `HEAD` request.
pub struct Read;
/// Marker: an insert, upsert, update or delete.
pub struct Write;

/// What a mutation sends back, as `Prefer: return=...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Returning {
    Minimal,
    Representation,
}

impl Returning {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Minimal => "return=minimal",
            Self::Representation => "return=representation",
        }
    }
}

/// Full-text search flavor of [`FilterBuilder::text_search`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextSearch {
    /// `to_tsquery`: the query uses tsquery syntax.
    #[default]
    Query,
    /// `plainto_tsquery`.
    Plain,
    /// `phraseto_tsquery`.
    Phrase,
    /// `websearch_to_tsquery`.
    Websearch,
}

impl TextSearch {
    const fn operator(self) -> &'static str {
        match self {
            Self::Query => "fts",
            Self::Plain => "plfts",
            Self::Phrase => "phfts",
            Self::Websearch => "wfts",
        }
    }
}

/// Builder for filters and transforms of one request.
///
/// The marker `K` is [`Read`] for selects and [`Write`] for mutations;
/// only mutations accept a trailing `select`.
pub struct FilterBuilder<K> {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) relation: String,
    pub(crate) schema: Option<String>,
    pub(crate) headers: BTreeMap<String, String>,
    pub(crate) returning: Option<Returning>,
    pub(crate) prefer: Vec<String>,
    pub(crate) params: Vec<(String, String)>,
    pub(crate) select: Option<String>,
    pub(crate) body: Option<Value>,
    pub(crate) response: ResponseKind,
    pub(crate) pending: Option<BuildError>,
    _kind: PhantomData<K>,
}

impl<K> FilterBuilder<K> {
    pub(crate) fn new(
        method: Method,
        url: Url,
        relation: String,
        schema: Option<String>,
        headers: BTreeMap<String, String>,
        returning: Option<Returning>,
    ) -> Self {
        Self {
            method,
            url,
            relation,
            schema,
            headers,
            returning,
            prefer: vec![],
            params: vec![],
            select: None,
            body: None,
            response: ResponseKind::Rows,
            pending: None,
            _kind: PhantomData,
        }
    }

    pub(crate) fn set_select(&mut self, columns: &str) {
        let cleaned = clean_select(columns);
        self.set_param("select", cleaned.clone());
        self.select = Some(cleaned);
    }

    pub(crate) fn prefer_count(&mut self, count: Option<Count>) {
        if let Some(count) = count {
            self.prefer.push(String::from(count.as_str()));
        }
    }

    /// Stores insert rows and, for bulk inserts, the `columns` parameter.
    pub(crate) fn set_rows(&mut self, values: Value) {
        match &values {
            Value::Object(_) => {}
            Value::Array(rows) => {
                let mut columns: Vec<&str> = vec![];
                for row in rows {
                    let Value::Object(row) = row else {
                        self.fail(BuildError::InvalidValues);
                        return;
                    };
                    for key in row.keys() {
                        if !columns.contains(&key.as_str()) {
                            columns.push(key);
                        }
                    }
                }
                let quoted: Vec<String> = columns.iter().map(|c| format!("\"{c}\"")).collect();
                let joined = quoted.join(",");
                self.set_param("columns", joined);
            }
            _ => {
                self.fail(BuildError::InvalidValues);
                return;
            }
        }
        self.body = Some(values);
    }

    /// Replaces a parameter, or appends it when absent.
    pub(crate) fn set_param(&mut self, key: &str, value: String) {
        if let Some(existing) = self.params.iter_mut().find(|(k, _)| k == key) {
            existing.1 = value;
        } else {
            self.params.push((String::from(key), value));
        }
    }

    /// Keeps the first error for `build`.
    pub(crate) fn fail(&mut self, error: BuildError) {
        if self.pending.is_none() {
            self.pending = Some(error);
        }
    }

    fn push_filter(mut self, column: &str, operator: &str, value: &str) -> Self {
        self.params
            .push((String::from(column), format!("{operator}.{value}")));
        self
    }

    // --- Comparison filters ---

    /// Matches rows where `column` equals `value`.
    #[must_use]
    pub fn eq(self, column: &str, value: impl ToFilterValue) -> Self {
        self.push_filter(column, "eq", &value.to_filter_value())
    }

    /// Matches rows where `column` differs from `value`.
    #[must_use]
    pub fn neq(self, column: &str, value: impl ToFilterValue) -> Self {
        self.push_filter(column, "neq", &value.to_filter_value())
    }

    /// Matches rows where `column` is greater than `value`.
    #[must_use]
    pub fn gt(self, column: &str, value: impl ToFilterValue) -> Self {
        self.push_filter(column, "gt", &value.to_filter_value())
    }

    /// Matches rows where `column` is greater than or equal to `value`.
    #[must_use]
    pub fn gte(self, column: &str, value: impl ToFilterValue) -> Self {
        self.push_filter(column, "gte", &value.to_filter_value())
    }

    /// Matches rows where `column` is less than `value`.
    #[must_use]
    pub fn lt(self, column: &str, value: impl ToFilterValue) -> Self {
        self.push_filter(column, "lt", &value.to_filter_value())
    }

    /// Matches rows where `column` is less than or equal to `value`.
    #[must_use]
    pub fn lte(self, column: &str, value: impl ToFilterValue) -> Self {
        self.push_filter(column, "lte", &value.to_filter_value())
    }

    // --- Pattern filters ---

    /// Case-sensitive `LIKE`; `%` and `*` are wildcards.
    #[must_use]
    pub fn like(self, column: &str, pattern: &str) -> Self {
        self.push_filter(column, "like", pattern)
    }

    /// `LIKE` against every pattern.
    #[must_use]
    pub fn like_all_of(self, column: &str, patterns: &[&str]) -> Self {
        self.push_filter(column, "like(all)", &array_literal(patterns))
    }

    /// `LIKE` against any pattern.
    #[must_use]
    pub fn like_any_of(self, column: &str, patterns: &[&str]) -> Self {
        self.push_filter(column, "like(any)", &array_literal(patterns))
    }

    /// Case-insensitive `ILIKE`.
    #[must_use]
    pub fn ilike(self, column: &str, pattern: &str) -> Self {
        self.push_filter(column, "ilike", pattern)
    }

    /// `ILIKE` against every pattern.
    #[must_use]
    pub fn ilike_all_of(self, column: &str, patterns: &[&str]) -> Self {
        self.push_filter(column, "ilike(all)", &array_literal(patterns))
    }

    /// `ILIKE` against any pattern.
    #[must_use]
    pub fn ilike_any_of(self, column: &str, patterns: &[&str]) -> Self {
        self.push_filter(column, "ilike(any)", &array_literal(patterns))
    }

    // --- Membership and identity ---

    /// `IS NULL` for `None`, `IS TRUE` / `IS FALSE` otherwise.
    #[must_use]
    pub fn is(self, column: &str, value: Option<bool>) -> Self {
        let value = match value {
            None => "null",
            Some(true) => "true",
            Some(false) => "false",
        };
        self.push_filter(column, "is", value)
    }

    /// Matches rows where `column` is one of `values`.
    ///
    /// Values containing `,`, `(` or `)` are double-quoted.
    #[must_use]
    pub fn in_<T: ToFilterValue>(self, column: &str, values: &[T]) -> Self {
        self.push_filter(column, "in", &in_list(values))
    }

    // --- Containers: arrays, ranges, jsonb ---

    /// `@>`: `column` contains every element of `value`.
    #[must_use]
    pub fn contains(self, column: &str, value: impl Into<Value>) -> Self {
        self.push_filter(column, "cs", &container(&value.into()))
    }

    /// `<@`: every element of `column` is in `value`.
    #[must_use]
    pub fn contained_by(self, column: &str, value: impl Into<Value>) -> Self {
        self.push_filter(column, "cd", &container(&value.into()))
    }

    /// `&&`: `column` and `value` share an element.
    #[must_use]
    pub fn overlaps(self, column: &str, value: impl Into<Value>) -> Self {
        self.push_filter(column, "ov", &container(&value.into()))
    }

    /// `>>`: the range is strictly right of `range`.
    #[must_use]
    pub fn range_gt(self, column: &str, range: &str) -> Self {
        self.push_filter(column, "sr", range)
    }

    /// `&>`: the range does not extend left of `range`.
    #[must_use]
    pub fn range_gte(self, column: &str, range: &str) -> Self {
        self.push_filter(column, "nxl", range)
    }

    /// `<<`: the range is strictly left of `range`.
    #[must_use]
    pub fn range_lt(self, column: &str, range: &str) -> Self {
        self.push_filter(column, "sl", range)
    }

    /// `&<`: the range does not extend right of `range`.
    #[must_use]
    pub fn range_lte(self, column: &str, range: &str) -> Self {
        self.push_filter(column, "nxr", range)
    }

    /// `-|-`: the ranges are adjacent.
    #[must_use]
    pub fn range_adjacent(self, column: &str, range: &str) -> Self {
        self.push_filter(column, "adj", range)
    }

    /// Full-text search on a `tsvector` column.
    #[must_use]
    pub fn text_search(
        self,
        column: &str,
        query: &str,
        kind: TextSearch,
        config: Option<&str>,
    ) -> Self {
        let operator = match config {
            Some(config) => format!("{}({config})", kind.operator()),
            None => String::from(kind.operator()),
        };
        self.push_filter(column, &operator, query)
    }

    // --- Combinators ---

    /// Adds an `eq` filter for each pair.
    #[must_use]
    pub fn match_all<T: ToFilterValue>(self, pairs: &[(&str, T)]) -> Self {
        pairs
            .iter()
            .fold(self, |builder, (column, value)| builder.eq(column, value))
    }

    /// Negates a raw filter: `column=not.operator.value`.
    #[must_use]
    pub fn not(self, column: &str, operator: &str, value: impl ToFilterValue) -> Self {
        let operator = format!("not.{operator}");
        self.push_filter(column, &operator, &value.to_filter_value())
    }

    /// Matches rows satisfying any of `filters`, written in raw
    /// gateway syntax (`id.eq.1,name.eq.alice`).
    ///
    /// With `referenced_table`, the disjunction applies to that embedded
    /// resource.
    #[must_use]
    pub fn or(mut self, filters: &str, referenced_table: Option<&str>) -> Self {
        let key = referenced_table.map_or_else(|| String::from("or"), |t| format!("{t}.or"));
        self.params.push((key, format!("({filters})")));
        self
    }

    /// Adds a raw filter, for operators without a dedicated method.
    #[must_use]
    pub fn filter(self, column: &str, operator: &str, value: impl ToFilterValue) -> Self {
        self.push_filter(column, operator, &value.to_filter_value())
    }

    // --- Finalization ---

    /// Returns the shape of the rows this request returns.
    ///
    /// Mutations without a `select` return no rows and yield an empty
    /// shape.
    ///
    /// # Errors
    ///
    /// Returns `SelectError` if the select expression is malformed or the
    /// relation is not in `schema`.
    pub fn shape(&self, schema: &Schema) -> std::result::Result<Shape, SelectError> {
        match &self.select {
            Some(select) => select_shape(schema, &self.relation, select),
            None => Ok(Shape::new()),
        }
    }

    /// Validates the select expression and builds the request.
    ///
    /// # Errors
    ///
    /// Returns the first problem recorded while building, or
    /// `BuildError::Select` for a malformed select expression.
    pub fn build(self) -> Result<Request> {
        if let Some(error) = self.pending {
            return Err(error);
        }
        if let Some(select) = &self.select {
            parse(select)?;
        }

        let mut url = self.url;
        let base = String::from(url.as_str());
        match url.path_segments_mut() {
            Ok(mut segments) => {
                segments.pop_if_empty().push(&self.relation);
            }
            Err(()) => return Err(BuildError::CannotBeABase(base)),
        }
        if !self.params.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.params);
        }

        let mut headers = self.headers;
        if let Some(schema) = self.schema {
            let name = if self.method.is_read() {
                "Accept-Profile"
            } else {
                "Content-Profile"
            };
            headers.insert(String::from(name), schema);
        }
        if self.body.is_some() {
            headers.insert(
                String::from("Content-Type"),
                String::from("application/json"),
            );
        }

        let prefer: Vec<String> = self
            .returning
            .map(|r| String::from(r.as_str()))
            .into_iter()
            .chain(self.prefer)
            .collect();
        if !prefer.is_empty() {
            headers.insert(String::from("Prefer"), prefer.join(","));
        }

        let object = match self.response {
            ResponseKind::Rows => false,
            ResponseKind::Single => true,
            ResponseKind::MaybeSingle => !self.method.is_read(),
        };
        if object {
            headers.insert(
                String::from("Accept"),
                String::from("application/vnd.pgrst.object+json"),
            );
        }

        let request = Request {
            method: self.method,
            url,
            headers,
            body: self.body,
            response: self.response,
        };
        debug!(
            method = %request.method,
            url = %request.url,
            "built request"
        );
        Ok(request)
    }
}
