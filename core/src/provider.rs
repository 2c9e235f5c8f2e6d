//! The dispatcher: one async entry point for every data request.
//!
//! # Design
//! `DataProvider` pairs a `RestClient` with an injected `Transport`. Single
//! requests go build -> send -> parse. `GetMany` has no batched endpoint on
//! the backend, so it becomes one `GET /{resource}/{id}` per id, gathered
//! with `try_join_all`: every request is issued before any is awaited,
//! results come back in input order, and the first failure fails the batch.

use futures::future::try_join_all;
use serde_json::Value;

use crate::client::RestClient;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::http::HttpRequest;
use crate::identifier::with_default_id;
use crate::transport::{FetchTransport, Transport};
use crate::types::{DataRequest, ProviderResult};

#[derive(Debug, Clone)]
pub struct DataProvider<T> {
    client: RestClient,
    transport: T,
}

impl DataProvider<FetchTransport> {
    /// Provider over the default reqwest transport, sending the configured
    /// default headers.
    pub fn with_fetch(config: ProviderConfig) -> Self {
        let transport = FetchTransport::new().with_default_headers(config.default_headers.clone());
        Self::new(config, transport)
    }
}

impl<T: Transport> DataProvider<T> {
    pub fn new(config: ProviderConfig, transport: T) -> Self {
        Self {
            client: RestClient::with_identifiers(&config.api_url, config.identifiers),
            transport,
        }
    }

    pub fn client(&self) -> &RestClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run a request given in the UI framework's loose form.
    ///
    /// An unknown `kind` fails with `UnsupportedOperation` before the
    /// transport is touched.
    pub async fn dispatch(&self, kind: &str, resource: &str, params: Value) -> Result<ProviderResult, ProviderError> {
        let request = DataRequest::from_parts(kind, params)?;
        self.execute(resource, request).await
    }

    #[tracing::instrument(skip(self, request), fields(operation = %request.operation()))]
    pub async fn execute(&self, resource: &str, request: DataRequest) -> Result<ProviderResult, ProviderError> {
        if let DataRequest::GetMany(params) = &request {
            return self.get_many(resource, &params.ids).await;
        }

        let http_request = self.client.build_request(resource, &request)?;
        tracing::debug!(method = %http_request.method, url = %http_request.url, "sending request");
        let response = self.transport.send(http_request).await?;
        self.client.parse_response(resource, &request, response)
    }

    async fn get_many(&self, resource: &str, ids: &[Value]) -> Result<ProviderResult, ProviderError> {
        let field = self.client.identifier_field(resource);
        tracing::trace!(count = ids.len(), "fetching records one by one");

        let fetches = ids.iter().map(|id| {
            let request = HttpRequest::get(self.client.record_url(resource, id));
            async move {
                let response = self.transport.send(request).await?;
                let json = response.json().map_err(ProviderError::Deserialization)?;
                Ok::<_, ProviderError>(json.map(|record| with_default_id(record, field)).unwrap_or(Value::Null))
            }
        });
        let data = try_join_all(fetches).await?;

        Ok(ProviderResult {
            data: Value::Array(data),
            total: None,
            body: None,
        })
    }
}
