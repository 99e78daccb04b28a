//! Ordering, paging and response-format transforms.

use crate::error::BuildError;
use crate::filter::{FilterBuilder, Returning, Write};
use crate::request::ResponseKind;

/// Options of [`FilterBuilder::order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderOptions {
    /// Ascending when true.
    pub ascending: bool,
    /// Place NULLs first (`Some(true)`) or last (`Some(false)`); the
    /// database default when `None`.
    pub nulls_first: Option<bool>,
    /// Order an embedded resource instead of the top-level rows.
    pub referenced_table: Option<String>,
}

impl Default for OrderOptions {
    fn default() -> Self {
        Self {
            ascending: true,
            nulls_first: None,
            referenced_table: None,
        }
    }
}

impl OrderOptions {
    /// Descending order.
    #[must_use]
    pub fn descending() -> Self {
        Self {
            ascending: false,
            ..Self::default()
        }
    }
}

fn scoped(key: &str, referenced_table: Option<&str>) -> String {
    referenced_table.map_or_else(|| String::from(key), |t| format!("{t}.{key}"))
}

impl<K> FilterBuilder<K> {
    /// Orders by `column`. Repeated calls add tie-breakers.
    #[must_use]
    pub fn order(mut self, column: &str, options: OrderOptions) -> Self {
        let key = scoped("order", options.referenced_table.as_deref());
        let direction = if options.ascending { "asc" } else { "desc" };
        let nulls = match options.nulls_first {
            None => "",
            Some(true) => ".nullsfirst",
            Some(false) => ".nullslast",
        };
        let term = format!("{column}.{direction}{nulls}");

        if let Some(existing) = self.params.iter_mut().find(|(k, _)| *k == key) {
            existing.1.push(',');
            existing.1.push_str(&term);
        } else {
            self.params.push((key, term));
        }
        self
    }

    /// Returns at most `count` rows.
    #[must_use]
    pub fn limit(mut self, count: u64, referenced_table: Option<&str>) -> Self {
        self.set_param(&scoped("limit", referenced_table), count.to_string());
        self
    }

    /// Returns rows `from` through `to`, both inclusive and zero-based.
    #[must_use]
    pub fn range(mut self, from: u64, to: u64, referenced_table: Option<&str>) -> Self {
        if to < from {
            self.fail(BuildError::InvalidRange { from, to });
            return self;
        }
        self.set_param(&scoped("offset", referenced_table), from.to_string());
        self.set_param(
            &scoped("limit", referenced_table),
            (to - from + 1).to_string(),
        );
        self
    }

    /// Expects exactly one row, returned as an object.
    #[must_use]
    pub const fn single(mut self) -> Self {
        self.response = ResponseKind::Single;
        self
    }

    /// Expects zero or one row.
    #[must_use]
    pub const fn maybe_single(mut self) -> Self {
        self.response = ResponseKind::MaybeSingle;
        self
    }
}

impl FilterBuilder<Write> {
    /// Returns the affected rows, selecting `columns`.
    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        self.set_select(columns);
        self.returning = Some(Returning::Representation);
        self
    }
}
