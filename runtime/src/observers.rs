//! Built-in lifecycle observers.
//!
//! - [`TracingObserver`]: structured logs for every hook
//! - [`LifecycleStats`]: started/succeeded/failed counters and the last error
//! - [`BroadcastObserver`]: republishes hooks as [`LifecycleEvent`]s on a
//!   broadcast channel

use platform_client_core::{
    HttpError, LifecycleEvent, LifecycleObserver, Outcome, RequestContext, ResponseInfo,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::broadcast;

/// Logs every lifecycle hook through `tracing`.
///
/// Cancellations are logged at `warn`, every other failure at `error`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl LifecycleObserver for TracingObserver {
    fn on_request(&self, context: &RequestContext) {
        tracing::debug!(
            request_id = %context.request_id,
            method = %context.request.method,
            url = %context.request.url,
            "HTTP request"
        );
    }

    fn on_response(&self, response: &ResponseInfo, context: &RequestContext) {
        tracing::debug!(
            request_id = %context.request_id,
            status = response.status,
            url = %response.url,
            "HTTP response"
        );
    }

    fn on_error(&self, error: &HttpError, context: &RequestContext) {
        if error.is_cancelled() {
            tracing::warn!(
                request_id = %context.request_id,
                url = %context.request.url,
                kind = %error.kind,
                "HTTP request cancelled: {error}"
            );
        } else {
            tracing::error!(
                request_id = %context.request_id,
                url = %context.request.url,
                kind = %error.kind,
                status = ?error.status,
                "HTTP request failed: {error}"
            );
        }
    }

    fn on_finally(&self, context: &RequestContext, outcome: Outcome) {
        tracing::debug!(request_id = %context.request_id, %outcome, "HTTP request settled");
    }
}

/// Point-in-time copy of [`LifecycleStats`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatsSnapshot {
    /// Calls dispatched
    pub started: u64,
    /// Calls that ended in a response
    pub succeeded: u64,
    /// Calls that ended in an error
    pub failed: u64,
    /// The most recent error
    pub last_error: Option<HttpError>,
}

/// Counts calls by outcome.
#[derive(Debug, Default)]
pub struct LifecycleStats {
    started: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    last_error: Mutex<Option<HttpError>>,
}

impl LifecycleStats {
    /// Create zeroed stats
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the current counters
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            started: self.started.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            last_error: self
                .last_error
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }

    /// Calls dispatched but not yet settled
    #[must_use]
    pub fn in_flight(&self) -> u64 {
        let settled = self.succeeded.load(Ordering::Relaxed) + self.failed.load(Ordering::Relaxed);
        self.started.load(Ordering::Relaxed).saturating_sub(settled)
    }
}

impl LifecycleObserver for LifecycleStats {
    fn on_request(&self, _context: &RequestContext) {
        self.started.fetch_add(1, Ordering::Relaxed);
    }

    fn on_response(&self, _response: &ResponseInfo, _context: &RequestContext) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    fn on_error(&self, error: &HttpError, _context: &RequestContext) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(error.clone());
    }
}

/// Republishes lifecycle hooks on a tokio broadcast channel.
///
/// Events are dropped when no receiver is subscribed. Slow receivers observe
/// `RecvError::Lagged` once the buffer overflows.
#[derive(Clone, Debug)]
pub struct BroadcastObserver {
    sender: broadcast::Sender<LifecycleEvent>,
}

impl BroadcastObserver {
    /// Create an emitter buffering up to `capacity` events per receiver
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to subsequent events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.sender.subscribe()
    }

    /// Number of live receivers
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    fn emit(&self, event: LifecycleEvent) {
        // No receivers is not an error for a fire-and-forget emitter
        let _ = self.sender.send(event);
    }
}

impl Default for BroadcastObserver {
    fn default() -> Self {
        Self::new(64)
    }
}

impl LifecycleObserver for BroadcastObserver {
    fn on_request(&self, context: &RequestContext) {
        self.emit(LifecycleEvent::Request {
            context: context.clone(),
        });
    }

    fn on_response(&self, response: &ResponseInfo, context: &RequestContext) {
        self.emit(LifecycleEvent::Response {
            response: response.clone(),
            context: context.clone(),
        });
    }

    fn on_error(&self, error: &HttpError, context: &RequestContext) {
        self.emit(LifecycleEvent::Error {
            error: error.clone(),
            context: context.clone(),
        });
    }

    fn on_finally(&self, context: &RequestContext, outcome: Outcome) {
        self.emit(LifecycleEvent::Finally {
            context: context.clone(),
            outcome,
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platform_client_core::{CancelReason, Headers, Method, RequestSnapshot, Utc};
    use serde_json::Value;

    fn context(id: &str) -> RequestContext {
        RequestContext {
            request_id: id.to_string(),
            started_at: Utc::now(),
            request: RequestSnapshot {
                method: Method::Get,
                url: "https://api.example/v1/tasks".to_string(),
                headers: Headers::new(),
                body: None,
                timeout: None,
            },
            show_global_loading: true,
        }
    }

    fn ok_response() -> ResponseInfo {
        ResponseInfo {
            status: 200,
            status_text: "OK".to_string(),
            headers: Headers::new(),
            url: "https://api.example/v1/tasks".to_string(),
            data: Value::Null,
        }
    }

    #[test]
    fn test_stats_count_outcomes() {
        let stats = LifecycleStats::new();
        let (a, b) = (context("a"), context("b"));

        stats.on_request(&a);
        stats.on_request(&b);
        assert_eq!(stats.in_flight(), 2);

        stats.on_response(&ok_response(), &a);
        stats.on_finally(&a, Outcome::Success);
        stats.on_error(&HttpError::cancelled(CancelReason::Caller), &b);
        stats.on_finally(&b, Outcome::Error);

        let snapshot = stats.snapshot();
        assert_eq!((snapshot.started, snapshot.succeeded, snapshot.failed), (2, 1, 1));
        assert!(snapshot.last_error.unwrap().is_cancelled());
        assert_eq!(stats.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_broadcast_preserves_hook_order() {
        let observer = BroadcastObserver::default();
        let mut rx = observer.subscribe();
        let ctx = context("req-1");

        observer.on_request(&ctx);
        observer.on_error(&HttpError::timeout(), &ctx);
        observer.on_finally(&ctx, Outcome::Error);

        let names: Vec<&str> = [
            rx.recv().await.unwrap(),
            rx.recv().await.unwrap(),
            rx.recv().await.unwrap(),
        ]
        .iter()
        .map(LifecycleEvent::name)
        .collect();
        assert_eq!(names, ["request", "error", "finally"]);
    }

    #[test]
    fn test_broadcast_without_receivers() {
        let observer = BroadcastObserver::new(0);
        assert_eq!(observer.receiver_count(), 0);
        observer.on_request(&context("req-1"));
    }

    #[test]
    fn test_tracing_observer_without_subscriber() {
        let ctx = context("req-1");
        TracingObserver.on_request(&ctx);
        TracingObserver.on_error(&HttpError::cancelled(CancelReason::Superseded), &ctx);
        TracingObserver.on_error(&HttpError::status(500, "", Value::Null), &ctx);
        TracingObserver.on_finally(&ctx, Outcome::Error);
    }
}
