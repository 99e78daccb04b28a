//! Client configuration and the entry point of the builder chain.

use std::collections::BTreeMap;

use serde::Deserialize;
use url::Url;

use crate::error::{BuildError, Result};
use crate::query::QueryBuilder;

/// Connection settings for a gateway.
///
/// ```json
/// { "url": "http://localhost:3000", "schema": "api", "headers": { "apikey": "..." } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the gateway.
    pub url: String,
    /// Database schema to target; the gateway default when unset.
    #[serde(default)]
    pub schema: Option<String>,
    /// Headers sent with every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl ClientConfig {
    /// Creates a configuration for the given base URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Entry point for building gateway requests.
#[derive(Debug, Clone)]
pub struct Client {
    base: Url,
    schema: Option<String>,
    headers: BTreeMap<String, String>,
}

impl Client {
    /// Creates a client for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::Url` if the URL does not parse and
    /// `BuildError::CannotBeABase` if it cannot carry a path.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_config(ClientConfig::new(base_url))
    }

    /// Creates a client from a configuration.
    ///
    /// # Errors
    ///
    /// Same as [`Client::new`].
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let base = Url::parse(&config.url)?;
        if base.cannot_be_a_base() {
            return Err(BuildError::CannotBeABase(config.url));
        }
        Ok(Self {
            base,
            schema: config.schema,
            headers: config.headers,
        })
    }

    /// Returns a client targeting another database schema.
    #[must_use]
    pub fn schema(&self, name: impl Into<String>) -> Self {
        Self {
            schema: Some(name.into()),
            ..self.clone()
        }
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Starts a request against a table or view.
    #[must_use]
    pub fn from(&self, relation: &str) -> QueryBuilder {
        QueryBuilder::new(
            self.base.clone(),
            relation,
            self.schema.clone(),
            self.headers.clone(),
        )
    }
}
