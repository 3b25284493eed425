//! Per-call context handed to lifecycle observers.

use crate::body::{Method, PreparedBody};
use crate::headers::Headers;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// The finalized request as it was sent, without any pipeline bookkeeping.
///
/// Attached to [`RequestContext`] and to every
/// [`HttpError`](crate::error::HttpError) so consumers can see what produced
/// an outcome.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestSnapshot {
    /// HTTP method
    pub method: Method,
    /// Fully resolved URL, including the query string
    pub url: String,
    /// Outgoing headers after id/auth/content-type injection
    pub headers: Headers,
    /// Body as handed to the transport
    pub body: Option<PreparedBody>,
    /// Effective timeout, `None` when disabled
    pub timeout: Option<Duration>,
}

/// Identity and timing of one dispatched call.
///
/// Created once per call and passed by reference to every hook, so the
/// `request_id` seen in `on_request`, `on_response`/`on_error` and
/// `on_finally` is always the same.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestContext {
    /// Caller-supplied or generated identifier
    pub request_id: String,
    /// Dispatch time
    pub started_at: DateTime<Utc>,
    /// Finalized request
    pub request: RequestSnapshot,
    /// Whether the caller asked for the global loading indicator
    pub show_global_loading: bool,
}

impl RequestContext {
    /// Time elapsed between dispatch and `now`, clamped at zero
    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        (now - self.started_at).to_std().unwrap_or_default()
    }
}

/// Successful response as seen by `on_response`.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseInfo {
    /// HTTP status
    pub status: u16,
    /// Reason phrase
    pub status_text: String,
    /// Response headers
    pub headers: Headers,
    /// Final URL (after redirects)
    pub url: String,
    /// Payload after the unwrap transform
    pub data: Value,
}

/// Terminal outcome reported to `on_finally`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The call resolved with a payload
    Success,
    /// The call failed
    Error,
}

impl Outcome {
    /// Lower-case tag
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
