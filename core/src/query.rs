//! Query-string construction for list-style requests.
//!
//! Parameters are assembled into an ordered list where a later `set` of an
//! existing key replaces its value in place, so filters named `sort`,
//! `page` or `count` are overridden by the real sort and pagination rather
//! than emitted twice. Output is `application/x-www-form-urlencoded`.

use serde_json::Value;
use url::form_urlencoded;

use crate::types::{ListParams, SortOrder};

#[derive(Debug, Default)]
struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    fn set(&mut self, key: &str, value: String) {
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// Render a JSON value as a query-string value: strings verbatim, anything
/// else as its JSON text.
fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Encode filters, sort and pagination for a list request.
///
/// `reference` adds a `target = id` filter for get-many-by-reference.
/// `page` is converted from one-based to zero-based.
pub fn list_query(params: &ListParams, reference: Option<(&str, &Value)>) -> String {
    let mut query = QueryParams::default();
    for (key, value) in &params.filter {
        query.set(key, query_value(value));
    }
    if let Some((target, id)) = reference {
        query.set(target, query_value(id));
    }
    if let Some(sort) = &params.sort {
        let value = match sort.order {
            SortOrder::Asc => sort.field.clone(),
            SortOrder::Desc => format!("-{}", sort.field),
        };
        query.set("sort", value);
    }
    if let Some(pagination) = params.pagination {
        query.set("page", pagination.page.saturating_sub(1).to_string());
        query.set("count", pagination.per_page.to_string());
    }
    query.encode()
}
