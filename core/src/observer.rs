//! Lifecycle notifications.
//!
//! Every dispatched call notifies observers in a fixed order:
//!
//! ```text
//! on_request ──► on_response ──► on_finally(Success)
//!            └─► on_error    ──► on_finally(Error)
//! ```
//!
//! Exactly one of `on_response`/`on_error` fires per call, followed by exactly
//! one `on_finally`. Hooks of different concurrent calls may interleave.

use crate::context::{Outcome, RequestContext, ResponseInfo};
use crate::error::HttpError;
use std::fmt;

/// Receives lifecycle notifications for every call made through a client.
///
/// All methods default to no-ops, so observers only implement what they need.
/// Hooks run inline on the calling task and must not block.
pub trait LifecycleObserver: Send + Sync {
    /// The call is about to hit the transport
    fn on_request(&self, _context: &RequestContext) {}

    /// The call succeeded; `response.data` is the unwrapped payload
    fn on_response(&self, _response: &ResponseInfo, _context: &RequestContext) {}

    /// The call failed
    fn on_error(&self, _error: &HttpError, _context: &RequestContext) {}

    /// The call reached its terminal state
    fn on_finally(&self, _context: &RequestContext, _outcome: Outcome) {}
}

/// Owned form of a lifecycle notification, for channel-based consumers.
#[derive(Clone, Debug, PartialEq)]
pub enum LifecycleEvent {
    /// See [`LifecycleObserver::on_request`]
    Request {
        /// Call context
        context: RequestContext,
    },
    /// See [`LifecycleObserver::on_response`]
    Response {
        /// Response summary
        response: ResponseInfo,
        /// Call context
        context: RequestContext,
    },
    /// See [`LifecycleObserver::on_error`]
    Error {
        /// Normalized error
        error: HttpError,
        /// Call context
        context: RequestContext,
    },
    /// See [`LifecycleObserver::on_finally`]
    Finally {
        /// Call context
        context: RequestContext,
        /// Terminal outcome
        outcome: Outcome,
    },
}

impl LifecycleEvent {
    /// Context of the call this event belongs to
    #[must_use]
    pub const fn context(&self) -> &RequestContext {
        match self {
            Self::Request { context }
            | Self::Response { context, .. }
            | Self::Error { context, .. }
            | Self::Finally { context, .. } => context,
        }
    }

    /// Identifier of the call this event belongs to
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.context().request_id
    }

    /// Short tag naming the hook (`request`, `response`, `error`, `finally`)
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Request { .. } => "request",
            Self::Response { .. } => "response",
            Self::Error { .. } => "error",
            Self::Finally { .. } => "finally",
        }
    }
}

type RequestHook = Box<dyn Fn(&RequestContext) + Send + Sync>;
type ResponseHook = Box<dyn Fn(&ResponseInfo, &RequestContext) + Send + Sync>;
type ErrorHook = Box<dyn Fn(&HttpError, &RequestContext) + Send + Sync>;
type FinallyHook = Box<dyn Fn(&RequestContext, Outcome) + Send + Sync>;

/// Closure-based observer.
///
/// ```
/// use platform_client_core::observer::Hooks;
///
/// let hooks = Hooks::new()
///     .on_request(|ctx| println!("-> {}", ctx.request_id))
///     .on_finally(|ctx, outcome| println!("<- {} {outcome}", ctx.request_id));
/// # let _ = hooks;
/// ```
#[derive(Default)]
pub struct Hooks {
    request: Option<RequestHook>,
    response: Option<ResponseHook>,
    error: Option<ErrorHook>,
    finally: Option<FinallyHook>,
}

impl Hooks {
    /// Create a set of no-op hooks
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the request hook
    #[must_use]
    pub fn on_request(mut self, hook: impl Fn(&RequestContext) + Send + Sync + 'static) -> Self {
        self.request = Some(Box::new(hook));
        self
    }

    /// Builder: set the response hook
    #[must_use]
    pub fn on_response(
        mut self,
        hook: impl Fn(&ResponseInfo, &RequestContext) + Send + Sync + 'static,
    ) -> Self {
        self.response = Some(Box::new(hook));
        self
    }

    /// Builder: set the error hook
    #[must_use]
    pub fn on_error(mut self, hook: impl Fn(&HttpError, &RequestContext) + Send + Sync + 'static) -> Self {
        self.error = Some(Box::new(hook));
        self
    }

    /// Builder: set the finally hook
    #[must_use]
    pub fn on_finally(mut self, hook: impl Fn(&RequestContext, Outcome) + Send + Sync + 'static) -> Self {
        self.finally = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_request", &self.request.is_some())
            .field("on_response", &self.response.is_some())
            .field("on_error", &self.error.is_some())
            .field("on_finally", &self.finally.is_some())
            .finish()
    }
}

impl LifecycleObserver for Hooks {
    fn on_request(&self, context: &RequestContext) {
        if let Some(hook) = &self.request {
            hook(context);
        }
    }

    fn on_response(&self, response: &ResponseInfo, context: &RequestContext) {
        if let Some(hook) = &self.response {
            hook(response, context);
        }
    }

    fn on_error(&self, error: &HttpError, context: &RequestContext) {
        if let Some(hook) = &self.error {
            hook(error, context);
        }
    }

    fn on_finally(&self, context: &RequestContext, outcome: Outcome) {
        if let Some(hook) = &self.finally {
            hook(context, outcome);
        }
    }
}
