//! Operation kinds, per-operation params and the normalized result.
//!
//! # Design
//! The UI framework speaks in `(kind, resource, params)` triples where
//! `params` is a loose JSON bag. `DataRequest` is the typed form: one
//! variant per operation, each carrying exactly the params it needs. The
//! loose form is accepted through `DataRequest::from_parts`, which is the
//! only place an unknown kind can appear.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProviderError;

/// The closed set of operations the provider understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetList,
    GetOne,
    GetMany,
    GetManyReference,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::GetList,
        Operation::GetOne,
        Operation::GetMany,
        Operation::GetManyReference,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
    ];

    /// The constant the UI framework uses for this operation.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::GetList => "GET_LIST",
            Operation::GetOne => "GET_ONE",
            Operation::GetMany => "GET_MANY",
            Operation::GetManyReference => "GET_MANY_REFERENCE",
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ProviderError;

    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == kind)
            .ok_or_else(|| ProviderError::UnsupportedOperation(kind.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

/// One-based page number and page size, as the UI framework sends them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    #[serde(rename = "perPage")]
    pub per_page: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub filter: Map<String, Value>,
    #[serde(default)]
    pub sort: Option<Sort>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetOneParams {
    pub id: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetManyParams {
    pub ids: Vec<Value>,
}

/// List the records of a resource whose `target` field equals `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetManyReferenceParams {
    pub target: String,
    pub id: Value,
    #[serde(flatten)]
    pub list: ListParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateParams {
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateParams {
    pub id: Value,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteParams {
    pub id: Value,
}

/// A typed data request: an operation together with its params.
#[derive(Debug, Clone, PartialEq)]
pub enum DataRequest {
    GetList(ListParams),
    GetOne(GetOneParams),
    GetMany(GetManyParams),
    GetManyReference(GetManyReferenceParams),
    Create(CreateParams),
    Update(UpdateParams),
    Delete(DeleteParams),
}

impl DataRequest {
    pub fn operation(&self) -> Operation {
        match self {
            DataRequest::GetList(_) => Operation::GetList,
            DataRequest::GetOne(_) => Operation::GetOne,
            DataRequest::GetMany(_) => Operation::GetMany,
            DataRequest::GetManyReference(_) => Operation::GetManyReference,
            DataRequest::Create(_) => Operation::Create,
            DataRequest::Update(_) => Operation::Update,
            DataRequest::Delete(_) => Operation::Delete,
        }
    }

    /// Build a request from a framework constant and a loose params bag.
    ///
    /// Fails with `UnsupportedOperation` for an unknown `kind` and with
    /// `InvalidParams` when `params` does not fit the operation. A `null`
    /// bag is read as an empty object.
    pub fn from_parts(kind: &str, params: Value) -> Result<Self, ProviderError> {
        let operation: Operation = kind.parse()?;
        let params = match params {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        Ok(match operation {
            Operation::GetList => DataRequest::GetList(typed(operation, params)?),
            Operation::GetOne => DataRequest::GetOne(typed(operation, params)?),
            Operation::GetMany => DataRequest::GetMany(typed(operation, params)?),
            Operation::GetManyReference => {
                DataRequest::GetManyReference(typed(operation, params)?)
            }
            Operation::Create => DataRequest::Create(typed(operation, params)?),
            Operation::Update => DataRequest::Update(typed(operation, params)?),
            Operation::Delete => DataRequest::Delete(typed(operation, params)?),
        })
    }
}

fn typed<T: DeserializeOwned>(operation: Operation, params: Value) -> Result<T, ProviderError> {
    serde_json::from_value(params).map_err(|source| ProviderError::InvalidParams {
        operation: operation.to_string(),
        source,
    })
}

/// The normalized shape handed back to the UI framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Raw response body; absent for fan-out requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}
