//! Stateless request builder and response parser for REST backends.
//!
//! # Design
//! `RestClient` holds only a `base_url` and the identifier map, and carries
//! no mutable state between calls. `build_request` turns a `DataRequest`
//! into an `HttpRequest`; `parse_response` turns the `HttpResponse` into a
//! `ProviderResult`. Executing the round-trip is left to a `Transport`, so
//! everything here is deterministic and testable without a network.

use serde_json::Value;

use crate::error::{ProviderError, CONTENT_RANGE};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::identifier::{with_default_id, IdentifierMap, DEFAULT_ID_FIELD};
use crate::query::list_query;
use crate::types::{DataRequest, ProviderResult};

/// Synchronous, stateless translator between data requests and HTTP.
#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: String,
    identifiers: IdentifierMap,
}

impl RestClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_identifiers(base_url, IdentifierMap::new())
    }

    pub fn with_identifiers(base_url: &str, identifiers: IdentifierMap) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            identifiers,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Identifier field used for records of `resource`.
    pub fn identifier_field(&self, resource: &str) -> &str {
        self.identifiers.resolve(resource)
    }

    /// URL of a single record.
    pub fn record_url(&self, resource: &str, id: &Value) -> String {
        format!("{}/{resource}/{}", self.base_url, id_segment(id))
    }

    /// Translate `request` into the HTTP call that serves it.
    ///
    /// `GetMany` has no single-call form and fails with
    /// `UnsupportedOperation`; `DataProvider` fans it out instead.
    pub fn build_request(&self, resource: &str, request: &DataRequest) -> Result<HttpRequest, ProviderError> {
        let collection = format!("{}/{resource}", self.base_url);
        let req = match request {
            DataRequest::GetList(params) => HttpRequest::get(with_query(collection, &list_query(params, None))),
            DataRequest::GetManyReference(params) => {
                let query = list_query(&params.list, Some((params.target.as_str(), &params.id)));
                HttpRequest::get(with_query(collection, &query))
            }
            DataRequest::GetOne(params) => HttpRequest::get(self.record_url(resource, &params.id)),
            DataRequest::Update(params) => HttpRequest {
                method: HttpMethod::Put,
                url: self.record_url(resource, &params.id),
                headers: json_headers(),
                body: Some(to_body(&params.data)?),
            },
            DataRequest::Create(params) => HttpRequest {
                method: HttpMethod::Post,
                url: collection,
                headers: json_headers(),
                body: Some(to_body(&params.data)?),
            },
            DataRequest::Delete(params) => HttpRequest {
                method: HttpMethod::Delete,
                url: self.record_url(resource, &params.id),
                headers: Vec::new(),
                body: None,
            },
            DataRequest::GetMany(_) => {
                return Err(ProviderError::UnsupportedOperation(
                    request.operation().to_string(),
                ))
            }
        };
        Ok(req)
    }

    /// Normalize the response to `request` into a `ProviderResult`.
    ///
    /// Every record in `data` carries its identifier under `id`, whatever
    /// the backend calls it. List-style responses must carry
    /// `Content-Range`, whose trailing `/<total>` becomes `total`.
    pub fn parse_response(
        &self,
        resource: &str,
        request: &DataRequest,
        response: HttpResponse,
    ) -> Result<ProviderResult, ProviderError> {
        let field = self.identifier_field(resource);
        let json = response.json().map_err(ProviderError::Deserialization)?;

        let (data, total) = match request {
            DataRequest::GetList(_) | DataRequest::GetManyReference(_) => {
                let total = parse_total(&response)?;
                let items: Vec<Value> = match json {
                    Some(value) => serde_json::from_value(value).map_err(ProviderError::Deserialization)?,
                    None => Vec::new(),
                };
                let data = items.into_iter().map(|item| with_default_id(item, field)).collect();
                (Value::Array(data), Some(total))
            }
            DataRequest::Create(params) => (created_record(&params.data, json.as_ref(), field), None),
            DataRequest::GetOne(_)
            | DataRequest::GetMany(_)
            | DataRequest::Update(_)
            | DataRequest::Delete(_) => {
                let data = json.map(|value| with_default_id(value, field)).unwrap_or(Value::Null);
                (data, None)
            }
        };

        Ok(ProviderResult {
            data,
            total,
            body: Some(response.body),
        })
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn to_body(data: &Value) -> Result<String, ProviderError> {
    serde_json::to_string(data).map_err(ProviderError::Serialization)
}

fn with_query(url: String, query: &str) -> String {
    if query.is_empty() {
        url
    } else {
        format!("{url}?{query}")
    }
}

/// Path segment for an identifier: strings verbatim, other scalars as JSON text.
fn id_segment(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_total(response: &HttpResponse) -> Result<u64, ProviderError> {
    let value = response
        .header(CONTENT_RANGE)
        .ok_or(ProviderError::MissingHeader { header: CONTENT_RANGE })?;
    value
        .rsplit('/')
        .next()
        .map(str::trim)
        .and_then(|total| total.parse().ok())
        .ok_or_else(|| ProviderError::InvalidHeader {
            header: CONTENT_RANGE,
            value: value.to_string(),
        })
}

/// The submitted record plus the identifier the backend assigned. The
/// resolved identifier field is preferred, with a literal `id` as fallback.
fn created_record(submitted: &Value, response: Option<&Value>, field: &str) -> Value {
    let assigned = response.and_then(|json| json.get(field).or_else(|| json.get(DEFAULT_ID_FIELD)));
    let mut record = submitted.clone();
    if let (Value::Object(map), Some(id)) = (&mut record, assigned) {
        map.insert(DEFAULT_ID_FIELD.to_string(), id.clone());
    }
    record
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::{
        CreateParams, DeleteParams, GetManyParams, GetManyReferenceParams, GetOneParams, ListParams,
        Pagination, Sort, UpdateParams,
    };

    fn client() -> RestClient {
        RestClient::with_identifiers(
            "http://localhost:3000",
            IdentifierMap::new().with("comments", "_id"),
        )
    }

    fn list_response(body: &str, content_range: Option<&str>) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: content_range
                .map(|v| vec![("Content-Range".to_string(), v.to_string())])
                .unwrap_or_default(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_produces_correct_request() {
        let req = client()
            .build_request(
                "posts",
                &DataRequest::GetList(ListParams {
                    filter: Default::default(),
                    sort: Some(Sort::desc("title")),
                    pagination: Some(Pagination {
                        page: 1,
                        per_page: 10,
                    }),
                }),
            )
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/posts?sort=-title&page=0&count=10");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_list_without_params_has_no_query() {
        let req = client()
            .build_request("posts", &DataRequest::GetList(ListParams::default()))
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/posts");
    }

    #[test]
    fn build_get_one_produces_correct_request() {
        let req = client()
            .build_request("posts", &DataRequest::GetOne(GetOneParams { id: json!(123) }))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/posts/123");
    }

    #[test]
    fn build_get_many_reference_filters_by_target() {
        let req = client()
            .build_request(
                "comments",
                &DataRequest::GetManyReference(GetManyReferenceParams {
                    target: "post_id".to_string(),
                    id: json!("p-1"),
                    list: ListParams {
                        sort: Some(Sort::asc("created_at")),
                        ..ListParams::default()
                    },
                }),
            )
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/comments?post_id=p-1&sort=created_at");
    }

    #[test]
    fn build_create_produces_correct_request() {
        let req = client()
            .build_request(
                "posts",
                &DataRequest::Create(CreateParams {
                    data: json!({"title": "Hello"}),
                }),
            )
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/posts");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"title": "Hello"}));
    }

    #[test]
    fn build_update_produces_correct_request() {
        let req = client()
            .build_request(
                "posts",
                &DataRequest::Update(UpdateParams {
                    id: json!(7),
                    data: json!({"title": "Edited"}),
                }),
            )
            .unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://localhost:3000/posts/7");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Edited");
    }

    #[test]
    fn build_delete_produces_correct_request() {
        let req = client()
            .build_request("posts", &DataRequest::Delete(DeleteParams { id: json!("abc") }))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://localhost:3000/posts/abc");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_get_many_is_not_a_single_request() {
        let err = client()
            .build_request("posts", &DataRequest::GetMany(GetManyParams { ids: vec![json!(1)] }))
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnsupportedOperation(kind) if kind == "GET_MANY"));
    }

    #[test]
    fn parse_list_reads_total_and_copies_identifier() {
        let result = client()
            .parse_response(
                "comments",
                &DataRequest::GetList(ListParams::default()),
                list_response(r#"[{"_id":"a","body":"x"},{"_id":"b","body":"y"}]"#, Some("items 0-9/37")),
            )
            .unwrap();
        assert_eq!(result.total, Some(37));
        assert_eq!(
            result.data,
            json!([
                {"_id": "a", "id": "a", "body": "x"},
                {"_id": "b", "id": "b", "body": "y"}
            ])
        );
    }

    #[test]
    fn parse_list_without_content_range_fails() {
        let err = client()
            .parse_response(
                "posts",
                &DataRequest::GetList(ListParams::default()),
                list_response(r#"[{"id":1}]"#, None),
            )
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingHeader { header: "Content-Range" }));
    }

    #[test]
    fn parse_list_with_unknown_total_fails() {
        let err = client()
            .parse_response(
                "posts",
                &DataRequest::GetList(ListParams::default()),
                list_response("[]", Some("posts 0-0/*")),
            )
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidHeader { .. }));
    }

    #[test]
    fn parse_list_rejects_non_array_body() {
        let err = client()
            .parse_response(
                "posts",
                &DataRequest::GetList(ListParams::default()),
                list_response(r#"{"id":1}"#, Some("posts 0-0/1")),
            )
            .unwrap_err();
        assert!(matches!(err, ProviderError::Deserialization(_)));
    }

    #[test]
    fn parse_get_one_copies_identifier() {
        let result = client()
            .parse_response(
                "comments",
                &DataRequest::GetOne(GetOneParams { id: json!("a") }),
                list_response(r#"{"_id":"a","body":"x"}"#, None),
            )
            .unwrap();
        assert_eq!(result.data["id"], "a");
        assert_eq!(result.data["_id"], "a");
        assert_eq!(result.total, None);
    }

    #[test]
    fn parse_create_merges_assigned_identifier() {
        let result = client()
            .parse_response(
                "posts",
                &DataRequest::Create(CreateParams {
                    data: json!({"title": "Hello"}),
                }),
                list_response(r#"{"id":99,"title":"Hello","created_at":"now"}"#, None),
            )
            .unwrap();
        assert_eq!(result.data, json!({"title": "Hello", "id": 99}));
    }

    #[test]
    fn parse_create_uses_resolved_identifier_field() {
        let result = client()
            .parse_response(
                "comments",
                &DataRequest::Create(CreateParams {
                    data: json!({"body": "First"}),
                }),
                list_response(r#"{"_id":"c-1","body":"First"}"#, None),
            )
            .unwrap();
        assert_eq!(result.data, json!({"body": "First", "id": "c-1"}));
    }

    #[test]
    fn parse_delete_with_empty_body_is_null() {
        let result = client()
            .parse_response(
                "posts",
                &DataRequest::Delete(DeleteParams { id: json!(1) }),
                HttpResponse {
                    status: 204,
                    headers: Vec::new(),
                    body: String::new(),
                },
            )
            .unwrap();
        assert_eq!(result.data, Value::Null);
    }

    #[test]
    fn parse_bad_json() {
        let err = client()
            .parse_response(
                "posts",
                &DataRequest::GetOne(GetOneParams { id: json!(1) }),
                list_response("not json", None),
            )
            .unwrap_err();
        assert!(matches!(err, ProviderError::Deserialization(_)));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = RestClient::new("http://localhost:3000/");
        assert_eq!(client.record_url("posts", &json!(1)), "http://localhost:3000/posts/1");
    }
}
