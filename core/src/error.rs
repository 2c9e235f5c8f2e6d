//! Error types for the data provider.
//!
//! # Design
//! `ProviderError` covers everything the translators can reject on their
//! own. Failures raised by a `Transport` are carried in
//! `ProviderError::Transport` untouched, so callers can still match on the
//! status code or the underlying network error.

/// Header the list-style operations read the total count from.
pub const CONTENT_RANGE: &str = "Content-Range";

/// Errors returned by `RestClient` and `DataProvider`.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The operation kind is not one of the recognized constants.
    #[error("unsupported data provider request type {0}")]
    UnsupportedOperation(String),

    /// A list-style response came back without the total-count header.
    #[error(
        "the {header} header is missing in the HTTP response. The REST client expects \
         responses for lists of resources to contain this header with the total number \
         of results to build the pagination. If you are using CORS, did you declare \
         {header} in the Access-Control-Expose-Headers header?"
    )]
    MissingHeader { header: &'static str },

    /// The total-count header is present but its trailing segment is not an integer.
    #[error("cannot read a total count from {header}: {value:?}")]
    InvalidHeader { header: &'static str, value: String },

    /// The loosely-typed params did not match the shape the operation needs.
    #[error("invalid params for {operation}: {source}")]
    InvalidParams {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The response body could not be deserialized into the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors raised while executing an `HttpRequest`.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The server answered with a status outside `200..300`.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failure from a caller-supplied transport.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    pub fn other(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        TransportError::Other(err.into())
    }

    /// Status code for `HttpError`, `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::HttpError { status, .. } => Some(*status),
            TransportError::Network(err) => err.status().map(|s| s.as_u16()),
            TransportError::Other(_) => None,
        }
    }
}
