//! Request descriptors: what a caller asks the pipeline to do.

use crate::body::{Method, RequestBody};
use crate::endpoint::QueryParams;
use crate::error::HttpError;
use crate::headers::Headers;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// One logical HTTP call.
///
/// Built with the `with_*` methods and consumed by the client. Fields left at
/// their defaults fall back to client configuration (base URL, timeout) or
/// are generated at dispatch (request id).
///
/// # Example
///
/// ```
/// use platform_client_core::descriptor::RequestDescriptor;
/// use serde_json::json;
///
/// # fn main() -> Result<(), platform_client_core::error::HttpError> {
/// let request = RequestDescriptor::get("/v1/tasks")
///     .with_query(&json!({"status": "done"}))?
///     .with_header("accept-language", "en");
/// assert!(request.params.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestDescriptor {
    /// HTTP method
    pub method: Method,
    /// Relative path or absolute URL
    pub url: String,
    /// Overrides the client's base URL for this call
    pub base_url: Option<String>,
    /// Query parameters appended to the URL
    pub params: Option<QueryParams>,
    /// Request body
    pub body: Option<RequestBody>,
    /// Per-call headers, layered over the client defaults
    pub headers: Headers,
    /// Caller-chosen request identifier
    pub request_id: Option<String>,
    /// Overrides the client's default timeout; zero disables it
    pub timeout: Option<Duration>,
    /// Caller cancellation signal
    pub cancel: Option<CancellationToken>,
    /// Ask consumers to show the global loading indicator
    pub show_global_loading: bool,
}

impl RequestDescriptor {
    /// Create a descriptor for `method` and `url`
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Self::default()
        }
    }

    /// `GET url`
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// `POST url`
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    /// `PUT url`
    #[must_use]
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    /// `PATCH url`
    #[must_use]
    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::Patch, url)
    }

    /// `DELETE url`
    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    /// Builder: override the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Builder: set query parameters from any serializable value.
    ///
    /// A value that serializes to `null` (such as `None`) leaves the
    /// descriptor without parameters.
    ///
    /// # Errors
    ///
    /// Returns an [`Encode`](crate::error::HttpErrorKind::Encode) error when
    /// the value does not serialize to an object.
    pub fn with_query<P: Serialize + ?Sized>(mut self, params: &P) -> Result<Self, HttpError> {
        self.params = QueryParams::from_serialize(params).map_err(|e| HttpError::encode(&e))?;
        Ok(self)
    }

    /// Builder: set already-built query parameters
    #[must_use]
    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = Some(params);
        self
    }

    /// Builder: set a JSON body from any serializable value.
    ///
    /// A value that serializes to `null` (such as `None`) leaves the
    /// descriptor without a body.
    ///
    /// # Errors
    ///
    /// Returns an [`Encode`](crate::error::HttpErrorKind::Encode) error when
    /// the value cannot be serialized.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, HttpError> {
        self.body = match serde_json::to_value(body).map_err(|e| HttpError::encode(&e))? {
            Value::Null => None,
            value => Some(RequestBody::Json(value)),
        };
        Ok(self)
    }

    /// Builder: set a body of any recognized kind
    #[must_use]
    pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Builder: add a header
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Builder: choose the request identifier
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Builder: override the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builder: attach a cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Builder: request the global loading indicator
    #[must_use]
    pub const fn with_global_loading(mut self, show: bool) -> Self {
        self.show_global_loading = show;
        self
    }
}
