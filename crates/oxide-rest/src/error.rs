//! Error types for request building.

use oxide_rest_core::ParseError;

/// Errors raised while building a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// The base URL does not parse.
    #[error("invalid base URL: {0}")]
    Url(#[from] url::ParseError),

    /// The base URL cannot carry a relation path (`mailto:`, `data:`, ...).
    #[error("base URL '{0}' cannot have path segments")]
    CannotBeABase(String),

    /// The select expression is malformed.
    #[error("invalid select expression: {0}")]
    Select(#[from] ParseError),

    /// Insert or upsert values are not an object or an array of objects.
    #[error("values must be a JSON object or an array of JSON objects")]
    InvalidValues,

    /// A row range ends before it starts.
    #[error("range end {to} is before range start {from}")]
    InvalidRange {
        /// First row, inclusive.
        from: u64,
        /// Last row, inclusive.
        to: u64,
    },
}

/// Result type for request building.
pub type Result<T> = std::result::Result<T, BuildError>;
