//! # oxide-rest
//!
//! Request builder for REST-over-SQL gateways.
//!
//! Requests are assembled with a chain that mirrors the gateway's own
//! vocabulary and finish as a plain [`Request`] value; sending it is left
//! to the HTTP client of your choice. Select expressions are validated
//! with the `oxide-rest-core` parser before a request is produced, and the
//! same builder can report the shape of the rows the request returns.
//!
//! ## Example
//!
//! ```rust
//! use oxide_rest::{Client, OrderOptions};
//!
//! let client = Client::new("http://localhost:3000").unwrap();
//! let request = client
//!     .from("messages")
//!     .select("id, message, author:users(username)")
//!     .eq("channel_id", 1)
//!     .order("id", OrderOptions::descending())
//!     .limit(10, None)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(request.method.as_str(), "GET");
//! assert_eq!(
//!     request.param("select").as_deref(),
//!     Some("id,message,author:users(username)")
//! );
//! assert_eq!(request.param("channel_id").as_deref(), Some("eq.1"));
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod query;
pub mod request;
pub mod transform;
pub mod value;

pub use config::{Client, ClientConfig};
pub use error::{BuildError, Result};
pub use filter::{FilterBuilder, Read, TextSearch, Write};
pub use query::{Count, InsertOptions, QueryBuilder, SelectOptions, UpsertOptions};
pub use request::{Method, Request, ResponseKind};
pub use transform::OrderOptions;
pub use value::ToFilterValue;
