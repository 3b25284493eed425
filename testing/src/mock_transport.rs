//! Scripted in-memory transport.
//!
//! Replies are queued per method and URL path. Each matching request takes
//! the front of its queue; the last reply stays in place and answers every
//! further request, so a single scripted reply serves a whole test.

#![allow(clippy::missing_panics_doc)]

use bytes::Bytes;
use futures::future::BoxFuture;
use platform_client_core::headers::CONTENT_TYPE;
use platform_client_core::{Headers, Method, Transport, TransportError, TransportRequest, TransportResponse};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

#[derive(Clone, Debug)]
enum Reply {
    Respond {
        status: u16,
        status_text: String,
        headers: Headers,
        body: Bytes,
    },
    Fail(TransportError),
    Hang,
}

/// One scripted reply
#[derive(Clone, Debug)]
pub struct MockResponse {
    reply: Reply,
    delay: Duration,
}

impl MockResponse {
    /// JSON body with `content-type: application/json`
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        let mut headers = Headers::new();
        headers.insert(CONTENT_TYPE, "application/json");
        Self::raw(status, headers, Bytes::from(body.to_string()))
    }

    /// Plain-text body
    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        let mut headers = Headers::new();
        headers.insert(CONTENT_TYPE, "text/plain; charset=utf-8");
        Self::raw(status, headers, Bytes::from(body.into()))
    }

    /// No body at all
    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self::raw(status, Headers::new(), Bytes::new())
    }

    /// Arbitrary headers and body
    #[must_use]
    pub fn raw(status: u16, headers: Headers, body: Bytes) -> Self {
        Self {
            reply: Reply::Respond {
                status,
                status_text: reason_phrase(status).to_string(),
                headers,
                body,
            },
            delay: Duration::ZERO,
        }
    }

    /// Fail at the transport level
    #[must_use]
    pub const fn error(error: TransportError) -> Self {
        Self {
            reply: Reply::Fail(error),
            delay: Duration::ZERO,
        }
    }

    /// Never complete; the call only ends through timeout or cancellation
    #[must_use]
    pub const fn hang() -> Self {
        Self {
            reply: Reply::Hang,
            delay: Duration::ZERO,
        }
    }

    /// Wait before replying
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Override the status text
    #[must_use]
    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        if let Reply::Respond { status_text, .. } = &mut self.reply {
            *status_text = text.into();
        }
        self
    }

    /// Add a response header
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let Reply::Respond { headers, .. } = &mut self.reply {
            headers.insert(name, value);
        }
        self
    }
}

/// In-memory [`Transport`] that records every request it receives.
///
/// # Example
///
/// ```
/// use platform_client_core::Method;
/// use platform_client_testing::{MockResponse, MockTransport};
/// use serde_json::json;
///
/// let transport = MockTransport::new();
/// transport.enqueue(Method::Get, "/v1/captchas", MockResponse::json(200, &json!({"data": {}})));
/// assert_eq!(transport.request_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<MockResponse>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    /// Create a transport with no routes
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `method` + `path` (path without scheme, host, or query)
    pub fn enqueue(&self, method: Method, path: &str, response: MockResponse) {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
    }

    /// Every request received so far, in arrival order
    #[must_use]
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent request
    #[must_use]
    pub fn last_request(&self) -> Option<TransportRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Number of requests received
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn next_reply(&self, method: Method, path: &str) -> Option<MockResponse> {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        let queue = routes.get_mut(&(method, path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Transport for MockTransport {
    fn send(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse, TransportError>> {
        let path = url_path(&request.url).to_string();
        let url = request.url.clone();
        let method = request.method;
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let reply = self.next_reply(method, &path).unwrap_or_else(|| {
            MockResponse::json(
                404,
                &serde_json::json!({ "message": format!("no route for {method} {path}") }),
            )
        });

        Box::pin(async move {
            if !reply.delay.is_zero() {
                tokio::time::sleep(reply.delay).await;
            }
            match reply.reply {
                Reply::Respond {
                    status,
                    status_text,
                    headers,
                    body,
                } => Ok(TransportResponse {
                    status,
                    status_text,
                    headers,
                    url,
                    body,
                }),
                Reply::Fail(error) => Err(error),
                Reply::Hang => future::pending().await,
            }
        })
    }
}

/// Path component of a URL: no scheme, host, query, or fragment.
#[must_use]
pub fn url_path(url: &str) -> &str {
    let without_origin = match url.find("://") {
        Some(scheme_end) => {
            let rest = &url[scheme_end + 3..];
            rest.find('/').map_or("/", |slash| &rest[slash..])
        }
        None => url,
    };
    let end = without_origin
        .find(['?', '#'])
        .unwrap_or(without_origin.len());
    &without_origin[..end]
}

const fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        205 => "Reset Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "",
    }
}
