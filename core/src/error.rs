//! The normalized error returned for every failed call.

use crate::context::RequestSnapshot;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Why an in-flight call was aborted before it completed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// The caller's cancellation token fired
    Caller,
    /// A newer call with the same dedup key replaced this one
    Superseded,
}

impl CancelReason {
    /// Message used for the resulting [`HttpError`]
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Caller => "Request aborted",
            Self::Superseded => "Request superseded by a newer duplicate",
        }
    }
}

/// Failure category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpErrorKind {
    /// The transport could not complete the exchange
    Network,
    /// The configured timeout elapsed
    Timeout,
    /// The call was aborted
    Cancelled(CancelReason),
    /// The server answered with a non-success status
    Status,
    /// The payload did not match the expected shape
    Decode,
    /// The request body or query could not be serialized
    Encode,
}

impl fmt::Display for HttpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => f.write_str("network"),
            Self::Timeout => f.write_str("timeout"),
            Self::Cancelled(CancelReason::Caller) => f.write_str("cancelled"),
            Self::Cancelled(CancelReason::Superseded) => f.write_str("superseded"),
            Self::Status => f.write_str("status"),
            Self::Decode => f.write_str("decode"),
            Self::Encode => f.write_str("encode"),
        }
    }
}

/// Normalized failure of a pipeline call
///
/// Every failure mode (transport error, timeout, cancellation, HTTP status,
/// payload mismatch) is reported through this one shape. `status` and `body`
/// are set whenever the server produced a response.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{message}")]
pub struct HttpError {
    /// Failure category
    pub kind: HttpErrorKind,
    /// Human-readable description
    pub message: String,
    /// HTTP status, when a response was received
    pub status: Option<u16>,
    /// Decoded response body, when a response was received
    pub body: Option<Value>,
    /// The request that failed; absent for errors raised before dispatch
    pub request: Option<RequestSnapshot>,
}

impl HttpError {
    /// Create an error of the given kind
    #[must_use]
    pub fn new(kind: HttpErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            body: None,
            request: None,
        }
    }

    /// Transport-level failure
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(HttpErrorKind::Network, message)
    }

    /// Timeout-triggered abort
    #[must_use]
    pub fn timeout() -> Self {
        Self::new(HttpErrorKind::Timeout, "Request timed out")
    }

    /// Caller- or duplicate-triggered abort
    #[must_use]
    pub fn cancelled(reason: CancelReason) -> Self {
        Self::new(HttpErrorKind::Cancelled(reason), reason.message())
    }

    /// Non-success status.
    ///
    /// The message is the reason phrase, or `HTTP {status}` when the server
    /// sent none.
    #[must_use]
    pub fn status(status: u16, status_text: &str, body: Value) -> Self {
        let message = if status_text.is_empty() {
            format!("HTTP {status}")
        } else {
            status_text.to_string()
        };
        Self {
            kind: HttpErrorKind::Status,
            message,
            status: Some(status),
            body: (!body.is_null()).then_some(body),
            request: None,
        }
    }

    /// Payload shape mismatch
    #[must_use]
    pub fn decode(error: &serde_json::Error) -> Self {
        Self::new(HttpErrorKind::Decode, format!("Invalid response payload: {error}"))
    }

    /// Serialization failure while building a request
    #[must_use]
    pub fn encode(error: &serde_json::Error) -> Self {
        Self::new(HttpErrorKind::Encode, format!("Invalid request payload: {error}"))
    }

    /// Builder: attach the request that produced this error
    #[must_use]
    pub fn with_request(mut self, request: RequestSnapshot) -> Self {
        self.request = Some(request);
        self
    }

    /// Builder: attach the response status and body
    #[must_use]
    pub fn with_response(mut self, status: u16, body: Value) -> Self {
        self.status = Some(status);
        self.body = (!body.is_null()).then_some(body);
        self
    }

    /// Whether the configured timeout caused the failure
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.kind, HttpErrorKind::Timeout)
    }

    /// Whether the call was aborted by a caller or a newer duplicate
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.kind, HttpErrorKind::Cancelled(_))
    }

    /// The `message` field of the response body, if there is a non-empty one
    #[must_use]
    pub fn body_message(&self) -> Option<String> {
        let message = self.body.as_ref()?.as_object()?.get("message")?;
        let text = match message {
            Value::Null => return None,
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}
