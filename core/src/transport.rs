//! The "perform one HTTP exchange" boundary.
//!
//! The pipeline never talks to a network library directly; it hands a
//! [`TransportRequest`] to a [`Transport`] and gets back a fully buffered
//! [`TransportResponse`]. Aborting a call drops the returned future, so
//! implementations must release their connection on drop (reqwest does).

use crate::body::{Method, PreparedBody};
use crate::headers::Headers;
use bytes::Bytes;
use futures::future::BoxFuture;
use thiserror::Error;

/// Request handed to the transport
#[derive(Clone, Debug, PartialEq)]
pub struct TransportRequest {
    /// HTTP method
    pub method: Method,
    /// Fully resolved URL
    pub url: String,
    /// Outgoing headers
    pub headers: Headers,
    /// Prepared body, if any
    pub body: Option<PreparedBody>,
}

/// Buffered response from the transport
#[derive(Clone, Debug, PartialEq)]
pub struct TransportResponse {
    /// HTTP status
    pub status: u16,
    /// Reason phrase, empty if unknown
    pub status_text: String,
    /// Response headers
    pub headers: Headers,
    /// Final URL after redirects
    pub url: String,
    /// Raw body
    pub body: Bytes,
}

impl TransportResponse {
    /// Whether the status is in the 2xx range
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Failures the transport can report
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The URL could not be used for a request
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Connection could not be established
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The exchange failed after connecting
    #[error("Request failed: {0}")]
    Request(String),

    /// The response body could not be read
    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Performs a single HTTP exchange.
///
/// # Example
///
/// ```ignore
/// struct Loopback;
///
/// impl Transport for Loopback {
///     fn send(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse, TransportError>> {
///         Box::pin(async move {
///             Ok(TransportResponse {
///                 status: 200,
///                 status_text: "OK".to_string(),
///                 headers: Headers::new(),
///                 url: request.url,
///                 body: Bytes::new(),
///             })
///         })
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    /// Send `request` and buffer the response.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response could be obtained.
    /// Non-success statuses are *not* errors at this layer.
    fn send(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse, TransportError>>;
}
