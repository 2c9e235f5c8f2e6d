//! REST data provider core.
//!
//! # Overview
//! Translates the abstract CRUD operations of an admin UI framework
//! (`GET_LIST`, `GET_ONE`, `GET_MANY`, `GET_MANY_REFERENCE`, `CREATE`,
//! `UPDATE`, `DELETE`) into plain REST calls, and maps the responses back
//! into a normalized `ProviderResult`.
//!
//! # Design
//! - `RestClient` is stateless: `build_request` produces an `HttpRequest`,
//!   `parse_response` consumes an `HttpResponse`. No I/O happens there.
//! - `DataProvider` is the async entry point. It owns an injected
//!   `Transport` and fans `GET_MANY` out into per-id fetches.
//! - Identifier fields are resolved per resource through an ordered
//!   `IdentifierMap`, and copied into `id` on every returned record.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod identifier;
pub mod provider;
pub mod query;
pub mod transport;
pub mod types;

pub use client::RestClient;
pub use config::ProviderConfig;
pub use error::{ProviderError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use identifier::{IdentifierMap, DEFAULT_ID_FIELD};
pub use provider::DataProvider;
pub use transport::{FetchTransport, Transport};
pub use types::{
    CreateParams, DataRequest, DeleteParams, GetManyParams, GetManyReferenceParams, GetOneParams,
    ListParams, Operation, Pagination, ProviderResult, Sort, SortOrder, UpdateParams,
};
