//! Select-expression nodes.

use core::fmt;

use crate::lexer::is_identifier_char;

/// A node of a select expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// `*`: every column of the current relation.
    Star,
    /// A column, computed value, or embedded resource.
    Field(Field),
    /// `...target(...)`: an embedding whose fields are spliced into the
    /// parent object.
    Spread {
        /// The embedded resource being spread.
        target: Field,
    },
}

/// Aggregate functions allowed after a `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    /// Looks up an aggregate by the name used in select expressions.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "count" => Some(Self::Count),
            "sum" => Some(Self::Sum),
            "avg" => Some(Self::Avg),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            _ => None,
        }
    }

    /// Returns the function name, which is also the default output key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Avg => "avg",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An aggregate applied to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    /// The function.
    pub function: AggregateFunction,
    /// Cast applied to the aggregate result (`id.sum()::text`).
    pub cast: Option<String>,
    /// True for `count()`, which counts rows instead of a column.
    pub standalone: bool,
}

/// A chain of JSON key accesses (`data->a->>b`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    /// Accessed keys, outermost first. Never empty.
    pub keys: Vec<String>,
    /// True when the final step is `->>` (text) rather than `->` (JSON).
    pub text: bool,
}

impl JsonPath {
    /// Returns the last accessed key.
    #[must_use]
    pub fn last(&self) -> &str {
        self.keys.last().map_or("", String::as_str)
    }

    /// Returns the keys joined with `.`.
    #[must_use]
    pub fn joined(&self) -> String {
        self.keys.join(".")
    }
}

/// A field node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Field {
    /// Column name, or relation name for embeddings.
    pub name: String,
    /// Output rename (`alias:name`).
    pub alias: Option<String>,
    /// Relationship disambiguator (`name!hint`).
    pub hint: Option<String>,
    /// Cast applied to the column or JSON path value.
    pub cast: Option<String>,
    /// Aggregate applied to the value.
    pub aggregate: Option<Aggregate>,
    /// JSON accessor chain.
    pub json_path: Option<JsonPath>,
    /// `!inner`: only rows with a matching embedded row are returned.
    pub inner_join: bool,
    /// True when the field was written with a parameter list, even `name()`.
    pub embedded: bool,
    /// Nodes selected from the embedded relation.
    pub children: Vec<Node>,
}

impl Field {
    /// Creates a leaf field for the given column.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates an embedding of `relation` selecting `children`.
    #[must_use]
    pub fn embed(relation: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            name: relation.into(),
            embedded: true,
            children,
            ..Self::default()
        }
    }

    /// Sets the alias.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets the relationship hint.
    #[must_use]
    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Marks the embedding as an inner join.
    #[must_use]
    pub const fn inner(mut self) -> Self {
        self.inner_join = true;
        self
    }

    /// Returns true if this field references another relation.
    #[must_use]
    pub const fn is_embedding(&self) -> bool {
        self.embedded
    }

    /// Returns the key this field occupies in the result object.
    ///
    /// Explicit alias first, then the last JSON key, then the aggregate
    /// function name, then the field name.
    #[must_use]
    pub fn output_name(&self) -> &str {
        if let Some(alias) = &self.alias {
            return alias;
        }
        if let Some(path) = &self.json_path {
            return path.last();
        }
        if let Some(aggregate) = &self.aggregate {
            return aggregate.function.as_str();
        }
        &self.name
    }
}

impl From<Field> for Node {
    fn from(field: Field) -> Self {
        Self::Field(field)
    }
}

fn write_identifier(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if !name.is_empty() && name.chars().all(is_identifier_char) {
        f.write_str(name)
    } else {
        write!(f, "\"{name}\"")
    }
}

/// Writes `name`, quoting it when written bare it would read as `reserved`.
fn write_unreserved(f: &mut fmt::Formatter<'_>, name: &str, reserved: &[&str]) -> fmt::Result {
    if reserved.contains(&name) {
        write!(f, "\"{name}\"")
    } else {
        write_identifier(f, name)
    }
}

fn write_nodes(f: &mut fmt::Formatter<'_>, nodes: &[Node]) -> fmt::Result {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{node}")?;
    }
    Ok(())
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(alias) = &self.alias {
            write_identifier(f, alias)?;
            f.write_str(":")?;
        }

        if let Some(aggregate) = self.aggregate.as_ref().filter(|a| a.standalone) {
            write!(f, "{}()", aggregate.function)?;
            if let Some(cast) = &aggregate.cast {
                f.write_str("::")?;
                write_identifier(f, cast)?;
            }
            return Ok(());
        }

        // `count()` would read back as the row-count aggregate.
        if self.embedded && self.children.is_empty() {
            write_unreserved(f, &self.name, &["count"])?;
        } else {
            write_identifier(f, &self.name)?;
        }

        if self.embedded {
            if let Some(hint) = &self.hint {
                f.write_str("!")?;
                write_unreserved(f, hint, &["inner", "left"])?;
            }
            if self.inner_join {
                f.write_str("!inner")?;
            }
            f.write_str("(")?;
            write_nodes(f, &self.children)?;
            return f.write_str(")");
        }

        if let Some(path) = &self.json_path {
            let last = path.keys.len().saturating_sub(1);
            for (i, key) in path.keys.iter().enumerate() {
                f.write_str(if path.text && i == last { "->>" } else { "->" })?;
                write_identifier(f, key)?;
            }
        }
        if let Some(cast) = &self.cast {
            f.write_str("::")?;
            write_identifier(f, cast)?;
        }
        if let Some(aggregate) = &self.aggregate {
            write!(f, ".{}()", aggregate.function)?;
            if let Some(cast) = &aggregate.cast {
                f.write_str("::")?;
                write_identifier(f, cast)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Star => f.write_str("*"),
            Self::Field(field) => write!(f, "{field}"),
            Self::Spread { target } => write!(f, "...{target}"),
        }
    }
}
