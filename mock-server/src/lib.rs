//! In-memory REST backend speaking the wire shape the data provider expects.
//!
//! Any resource name is accepted; records are JSON objects keyed by a
//! per-resource identifier field (`id` unless configured otherwise). List
//! responses honour equality filters, `sort` / `-sort`, zero-based `page`
//! with `count`, and report the total through `Content-Range`.

use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Resource name -> identifier field. Missing resources use `id`.
    pub id_fields: HashMap<String, String>,
    /// Whether list responses carry `Content-Range`.
    pub content_range: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            id_fields: HashMap::new(),
            content_range: true,
        }
    }
}

impl ServerConfig {
    pub fn with_id_field(mut self, resource: &str, field: &str) -> Self {
        self.id_fields.insert(resource.to_string(), field.to_string());
        self
    }

    pub fn without_content_range(mut self) -> Self {
        self.content_range = false;
        self
    }

    fn id_field(&self, resource: &str) -> &str {
        self.id_fields.get(resource).map(String::as_str).unwrap_or("id")
    }
}

pub struct AppState {
    config: ServerConfig,
    db: RwLock<HashMap<String, Vec<Map<String, Value>>>>,
}

pub type Db = Arc<AppState>;

pub fn app() -> Router {
    router(ServerConfig::default())
}

pub fn router(config: ServerConfig) -> Router {
    let state: Db = Arc::new(AppState {
        config,
        db: RwLock::new(HashMap::new()),
    });
    Router::new()
        .route("/{resource}", get(list_records).post(create_record))
        .route(
            "/{resource}/{id}",
            get(get_record).put(update_record).delete(delete_record),
        )
        .with_state(state)
}

pub async fn run(listener: TcpListener, config: ServerConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, router(config)).await
}

/// Query-string form of a JSON value: strings verbatim, the rest as JSON text.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => render(x).cmp(&render(y)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

fn parse_usize(query: &HashMap<String, String>, key: &str) -> Result<Option<usize>, StatusCode> {
    query
        .get(key)
        .map(|v| v.parse().map_err(|_| StatusCode::BAD_REQUEST))
        .transpose()
}

async fn list_records(
    State(state): State<Db>,
    Path(resource): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<(HeaderMap, Json<Vec<Map<String, Value>>>), StatusCode> {
    let db = state.db.read().await;
    let mut records: Vec<Map<String, Value>> = db
        .get(&resource)
        .map(|all| {
            all.iter()
                .filter(|record| {
                    query
                        .iter()
                        .filter(|(key, _)| !matches!(key.as_str(), "sort" | "page" | "count"))
                        .all(|(key, expected)| record.get(key).is_some_and(|v| &render(v) == expected))
                })
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    drop(db);

    if let Some(sort) = query.get("sort") {
        let (field, descending) = match sort.strip_prefix('-') {
            Some(field) => (field, true),
            None => (sort.as_str(), false),
        };
        records.sort_by(|a, b| {
            let ord = compare(a.get(field), b.get(field));
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });
    }

    let total = records.len();
    let count = parse_usize(&query, "count")?.unwrap_or(total);
    let start = parse_usize(&query, "page")?.unwrap_or(0).saturating_mul(count).min(total);
    let end = start.saturating_add(count).min(total);
    let page: Vec<Map<String, Value>> = records[start..end].to_vec();

    let mut headers = HeaderMap::new();
    if state.config.content_range {
        let range = if page.is_empty() {
            format!("{resource} */{total}")
        } else {
            format!("{resource} {start}-{}/{total}", end - 1)
        };
        let value = HeaderValue::from_str(&range).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        headers.insert(header::CONTENT_RANGE, value);
        headers.insert(
            header::ACCESS_CONTROL_EXPOSE_HEADERS,
            HeaderValue::from_static("Content-Range"),
        );
    }
    Ok((headers, Json(page)))
}

async fn create_record(
    State(state): State<Db>,
    Path(resource): Path<String>,
    Json(input): Json<Value>,
) -> Result<(StatusCode, Json<Map<String, Value>>), StatusCode> {
    let Value::Object(mut record) = input else {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    };
    let field = state.config.id_field(&resource).to_string();
    record
        .entry(field.clone())
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));

    tracing::debug!(%resource, id = %render(&record[&field]), "created record");
    state
        .db
        .write()
        .await
        .entry(resource)
        .or_default()
        .push(record.clone());
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_record(
    State(state): State<Db>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Json<Map<String, Value>>, StatusCode> {
    let field = state.config.id_field(&resource);
    let db = state.db.read().await;
    db.get(&resource)
        .and_then(|records| records.iter().find(|r| r.get(field).map(render).as_deref() == Some(id.as_str())))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_record(
    State(state): State<Db>,
    Path((resource, id)): Path<(String, String)>,
    Json(input): Json<Value>,
) -> Result<Json<Map<String, Value>>, StatusCode> {
    let Value::Object(changes) = input else {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    };
    let field = state.config.id_field(&resource);
    let mut db = state.db.write().await;
    let record = db
        .get_mut(&resource)
        .and_then(|records| records.iter_mut().find(|r| r.get(field).map(render).as_deref() == Some(id.as_str())))
        .ok_or(StatusCode::NOT_FOUND)?;
    for (key, value) in changes {
        if key != field {
            record.insert(key, value);
        }
    }
    Ok(Json(record.clone()))
}

async fn delete_record(
    State(state): State<Db>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Json<Map<String, Value>>, StatusCode> {
    let field = state.config.id_field(&resource);
    let mut db = state.db.write().await;
    let records = db.get_mut(&resource).ok_or(StatusCode::NOT_FOUND)?;
    let index = records
        .iter()
        .position(|r| r.get(field).map(render).as_deref() == Some(id.as_str()))
        .ok_or(StatusCode::NOT_FOUND)?;
    tracing::debug!(%resource, %id, "deleted record");
    Ok(Json(records.remove(index)))
}
