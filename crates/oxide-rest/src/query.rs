//! Starting points of a request: read or write a relation.

use std::collections::BTreeMap;

use serde_json::Value;
use url::Url;

use crate::filter::{FilterBuilder, Read, Returning, Write};
use crate::request::Method;

/// Row counting strategy, sent as `Prefer: count=...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    /// `COUNT(*)`, exact but slow on large tables.
    Exact,
    /// The planner's estimate.
    Planned,
    /// Exact under a threshold, planned above it.
    Estimated,
}

impl Count {
    /// Returns the `Prefer` value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "count=exact",
            Self::Planned => "count=planned",
            Self::Estimated => "count=estimated",
        }
    }
}

/// Options of [`QueryBuilder::select_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectOptions {
    /// Send `HEAD` so only the count comes back.
    pub head: bool,
    /// Count the matching rows.
    pub count: Option<Count>,
}

/// Options of [`QueryBuilder::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertOptions {
    /// Count the inserted rows.
    pub count: Option<Count>,
    /// Missing keys in bulk inserts become NULL; when false they take the
    /// column default.
    pub default_to_null: bool,
}

impl Default for InsertOptions {
    fn default() -> Self {
        Self {
            count: None,
            default_to_null: true,
        }
    }
}

/// Options of [`QueryBuilder::upsert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOptions {
    /// Comma-separated unique columns to detect conflicts on.
    pub on_conflict: Option<String>,
    /// Skip conflicting rows instead of merging them.
    pub ignore_duplicates: bool,
    /// Count the affected rows.
    pub count: Option<Count>,
    /// Same as [`InsertOptions::default_to_null`].
    pub default_to_null: bool,
}

impl Default for UpsertOptions {
    fn default() -> Self {
        Self {
            on_conflict: None,
            ignore_duplicates: false,
            count: None,
            default_to_null: true,
        }
    }
}

/// Request builder for one relation, before the operation is chosen.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    url: Url,
    relation: String,
    schema: Option<String>,
    headers: BTreeMap<String, String>,
}

impl QueryBuilder {
    pub(crate) fn new(
        url: Url,
        relation: &str,
        schema: Option<String>,
        headers: BTreeMap<String, String>,
    ) -> Self {
        Self {
            url,
            relation: String::from(relation),
            schema,
            headers,
        }
    }

    /// Returns the relation being queried.
    #[must_use]
    pub fn relation(&self) -> &str {
        &self.relation
    }

    /// Reads rows, selecting `columns` (a select expression).
    #[must_use]
    pub fn select(self, columns: &str) -> FilterBuilder<Read> {
        self.select_with(columns, SelectOptions::default())
    }

    /// Reads rows with counting or `HEAD` options.
    #[must_use]
    pub fn select_with(self, columns: &str, options: SelectOptions) -> FilterBuilder<Read> {
        let method = if options.head {
            Method::Head
        } else {
            Method::Get
        };
        let mut builder = self.into_builder(method, None);
        builder.set_select(columns);
        builder.prefer_count(options.count);
        builder
    }

    /// Inserts one row (an object) or many (an array of objects).
    ///
    /// For arrays the `columns` parameter lists the union of every row's
    /// keys, so rows missing a key still insert.
    #[must_use]
    pub fn insert(self, values: Value, options: InsertOptions) -> FilterBuilder<Write> {
        let mut builder = self.into_builder(Method::Post, Some(Returning::Minimal));
        builder.prefer_count(options.count);
        if !options.default_to_null {
            builder.prefer.push(String::from("missing=default"));
        }
        builder.set_rows(values);
        builder
    }

    /// Inserts rows, resolving unique conflicts by merging or skipping.
    #[must_use]
    pub fn upsert(self, values: Value, options: UpsertOptions) -> FilterBuilder<Write> {
        let mut builder = self.into_builder(Method::Post, Some(Returning::Minimal));
        builder.prefer.push(String::from(if options.ignore_duplicates {
            "resolution=ignore-duplicates"
        } else {
            "resolution=merge-duplicates"
        }));
        if let Some(on_conflict) = options.on_conflict {
            builder.params.push((String::from("on_conflict"), on_conflict));
        }
        builder.prefer_count(options.count);
        if !options.default_to_null {
            builder.prefer.push(String::from("missing=default"));
        }
        builder.set_rows(values);
        builder
    }

    /// Updates the rows matched by the filters that follow.
    #[must_use]
    pub fn update(self, values: Value, count: Option<Count>) -> FilterBuilder<Write> {
        let mut builder = self.into_builder(Method::Patch, Some(Returning::Minimal));
        builder.prefer_count(count);
        builder.body = Some(values);
        builder
    }

    /// Deletes the rows matched by the filters that follow.
    #[must_use]
    pub fn delete(self, count: Option<Count>) -> FilterBuilder<Write> {
        let mut builder = self.into_builder(Method::Delete, Some(Returning::Minimal));
        builder.prefer_count(count);
        builder
    }

    fn into_builder<K>(self, method: Method, returning: Option<Returning>) -> FilterBuilder<K> {
        FilterBuilder::new(
            method,
            self.url,
            self.relation,
            self.schema,
            self.headers,
            returning,
        )
    }
}
