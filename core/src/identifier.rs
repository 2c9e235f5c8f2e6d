//! Per-resource identifier field resolution.
//!
//! Backends do not agree on what the primary key is called (`id`, `_id`,
//! `uuid`, ...). An `IdentifierMap` records that per resource, keyed either
//! by the exact resource name or by a regular expression over it.
//!
//! Resolution order:
//! 1. an entry whose key equals the resource name;
//! 2. the first entry, in insertion order, whose key as a pattern matches
//!    the whole resource name;
//! 3. [`DEFAULT_ID_FIELD`].

use std::fmt;

use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Field name every normalized record exposes its identifier under.
pub const DEFAULT_ID_FIELD: &str = "id";

#[derive(Debug, Clone)]
struct IdentifierEntry {
    key: String,
    pattern: Option<Regex>,
    field: String,
}

/// Ordered mapping of resource name (or pattern) to identifier field.
#[derive(Debug, Clone, Default)]
pub struct IdentifierMap {
    entries: Vec<IdentifierEntry>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. A key that does not compile as a regular expression
    /// still matches its resource by exact name.
    pub fn insert(&mut self, key: impl Into<String>, field: impl Into<String>) {
        let key = key.into();
        let pattern = match Regex::new(&format!("^(?:{key})$")) {
            Ok(pattern) => Some(pattern),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "identifier key is not a valid pattern, using exact match only");
                None
            }
        };
        self.entries.push(IdentifierEntry {
            key,
            pattern,
            field: field.into(),
        });
    }

    pub fn with(mut self, key: impl Into<String>, field: impl Into<String>) -> Self {
        self.insert(key, field);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The identifier field for `resource`. Never fails.
    pub fn resolve(&self, resource: &str) -> &str {
        if let Some(entry) = self.entries.iter().find(|e| e.key == resource) {
            return &entry.field;
        }
        self.entries
            .iter()
            .find(|e| e.pattern.as_ref().is_some_and(|p| p.is_match(resource)))
            .map(|e| e.field.as_str())
            .unwrap_or(DEFAULT_ID_FIELD)
    }
}

impl<K, F> FromIterator<(K, F)> for IdentifierMap
where
    K: Into<String>,
    F: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, F)>>(iter: I) -> Self {
        let mut map = IdentifierMap::new();
        for (key, field) in iter {
            map.insert(key, field);
        }
        map
    }
}

// Deserialized through a visitor so entries keep document order; a
// `HashMap`/`BTreeMap` detour would lose the first-match-wins ordering.
impl<'de> Deserialize<'de> for IdentifierMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdentifierMapVisitor;

        impl<'de> Visitor<'de> for IdentifierMapVisitor {
            type Value = IdentifierMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of resource name or pattern to identifier field")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = IdentifierMap::new();
                while let Some((key, field)) = access.next_entry::<String, String>()? {
                    map.insert(key, field);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(IdentifierMapVisitor)
    }
}

/// Copy the value under `field` into [`DEFAULT_ID_FIELD`], keeping every
/// original field. Non-objects and records without `field` pass through.
pub fn with_default_id(mut record: Value, field: &str) -> Value {
    if field != DEFAULT_ID_FIELD {
        if let Value::Object(map) = &mut record {
            if let Some(id) = map.get(field).cloned() {
                map.insert(DEFAULT_ID_FIELD.to_string(), id);
            }
        }
    }
    record
}
