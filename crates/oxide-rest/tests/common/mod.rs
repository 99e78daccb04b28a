#![allow(dead_code)]

use oxide_rest::{BuildError, Client, FilterBuilder, Request};

pub const BASE_URL: &str = "http://localhost:3000";

pub fn client() -> Client {
    Client::new(BASE_URL).unwrap_or_else(|e| panic!("Failed to create client: {e}"))
}

pub fn build<K>(builder: FilterBuilder<K>) -> Request {
    builder
        .build()
        .unwrap_or_else(|e| panic!("Failed to build request: {e}"))
}

pub fn build_err<K>(builder: FilterBuilder<K>) -> BuildError {
    match builder.build() {
        Ok(request) => panic!("Expected build error, got {}", request.url),
        Err(e) => e,
    }
}

/// Returns the decoded value of `key`, panicking when it is missing.
pub fn param(request: &Request, key: &str) -> String {
    request
        .param(key)
        .unwrap_or_else(|| panic!("Missing parameter `{key}` in {}", request.url))
}
