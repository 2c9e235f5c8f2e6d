//! Provider configuration.
//!
//! Deserializable so it can live in whatever config file the host already
//! reads, e.g.
//!
//! ```json
//! {
//!   "api_url": "https://api.example.com",
//!   "identifiers": { "comments": "_id", "audit_.*": "uuid" },
//!   "default_headers": { "authorization": "Bearer ..." }
//! }
//! ```
//!
//! `identifiers` is order-sensitive. Deserialize straight from the source
//! text; routing through `serde_json::Value` first sorts the keys.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::identifier::IdentifierMap;

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub api_url: String,
    #[serde(default)]
    pub identifiers: IdentifierMap,
    /// Sent on every request by the default transport.
    #[serde(default)]
    pub default_headers: BTreeMap<String, String>,
}

impl ProviderConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            identifiers: IdentifierMap::new(),
            default_headers: BTreeMap::new(),
        }
    }

    pub fn with_identifier(mut self, key: impl Into<String>, field: impl Into<String>) -> Self {
        self.identifiers.insert(key, field);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }
}
