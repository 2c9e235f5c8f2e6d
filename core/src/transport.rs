//! The I/O seam: executing an `HttpRequest` and returning an `HttpResponse`.
//!
//! # Design
//! `DataProvider` never talks to the network itself. Callers inject any
//! `Transport`; `FetchTransport` is the default, a JSON-aware reqwest client
//! that treats any status outside `200..300` as `TransportError::HttpError`.
//! Retries, timeouts and authentication belong to the transport.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::ACCEPT;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

/// Default transport: `accept: application/json` on every request, plus
/// any configured default headers (e.g. `authorization`).
#[derive(Debug, Clone, Default)]
pub struct FetchTransport {
    client: reqwest::Client,
    default_headers: Vec<(String, String)>,
}

impl FetchTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            default_headers: Vec::new(),
        }
    }

    pub fn with_default_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.default_headers.extend(headers);
        self
    }
}

fn method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(method(request.method), &request.url)
            .header(ACCEPT, "application/json");
        for (name, value) in self.default_headers.iter().chain(request.headers.iter()) {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await?;

        if !(200..300).contains(&status) {
            tracing::debug!(status, url = %request.url, "request failed");
            return Err(TransportError::HttpError { status, body });
        }
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
