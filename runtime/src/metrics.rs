//! Prometheus metrics for request pipeline observability.
//!
//! Every call through an [`HttpClient`](crate::HttpClient) with a
//! [`MetricsObserver`] attached records:
//! - Requests dispatched, labelled by method
//! - Responses received, labelled by method and status
//! - Errors, labelled by method and error kind
//! - Call duration, from dispatch to the terminal notification
//!
//! # Example
//!
//! ```rust,no_run
//! use platform_client_runtime::metrics::{ClientMetrics, MetricsObserver};
//! use platform_client_runtime::HttpClient;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut metrics = ClientMetrics::new();
//! metrics.install()?;
//!
//! let client = HttpClient::builder()
//!     .observer(Arc::new(MetricsObserver::default()))
//!     .build();
//!
//! // Prometheus text exposition of everything recorded so far
//! let _text = metrics.render();
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use platform_client_core::environment::{Clock, SystemClock};
use platform_client_core::{HttpError, HttpErrorKind, Outcome, RequestContext, ResponseInfo};
use platform_client_core::LifecycleObserver;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus exporter handle for client metrics.
#[derive(Default)]
pub struct ClientMetrics {
    handle: Option<PrometheusHandle>,
}

impl ClientMetrics {
    /// Create an exporter that has not been installed yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Describe client metrics and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// Only one recorder can be installed per process. If one already is
    /// (e.g., in tests), this succeeds without a handle and [`render`](Self::render)
    /// returns `None`.
    pub fn install(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[
                    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
                ],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!("Client metrics recorder installed");
                Ok(())
            }
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            }
        }
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus format.
    ///
    /// Returns `None` if the recorder was not installed by this instance.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

fn register_metrics() {
    describe_counter!(
        "http_client_requests_total",
        "Total number of requests dispatched"
    );
    describe_counter!(
        "http_client_responses_total",
        "Total number of successful responses"
    );
    describe_counter!(
        "http_client_errors_total",
        "Total number of failed calls, by error kind"
    );
    describe_histogram!(
        "http_client_request_duration_seconds",
        "Time from dispatch to the terminal notification"
    );
}

/// Request pipeline metrics recorder.
pub struct RequestMetrics;

impl RequestMetrics {
    /// Record a dispatched request.
    pub fn record_request(method: &'static str) {
        counter!("http_client_requests_total", "method" => method).increment(1);
    }

    /// Record a successful response.
    pub fn record_response(method: &'static str, status: u16) {
        counter!(
            "http_client_responses_total",
            "method" => method,
            "status" => status.to_string()
        )
        .increment(1);
    }

    /// Record a failed call.
    pub fn record_error(method: &'static str, kind: HttpErrorKind) {
        counter!(
            "http_client_errors_total",
            "method" => method,
            "kind" => kind.to_string()
        )
        .increment(1);
    }

    /// Record the duration of a settled call.
    pub fn record_duration(method: &'static str, outcome: Outcome, duration: Duration) {
        histogram!(
            "http_client_request_duration_seconds",
            "method" => method,
            "outcome" => outcome.as_str()
        )
        .record(duration.as_secs_f64());
    }
}

/// Lifecycle observer that feeds [`RequestMetrics`].
#[derive(Clone)]
pub struct MetricsObserver {
    clock: Arc<dyn Clock>,
}

impl MetricsObserver {
    /// Measure durations with the given clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for MetricsObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MetricsObserver")
    }
}

impl LifecycleObserver for MetricsObserver {
    fn on_request(&self, context: &RequestContext) {
        RequestMetrics::record_request(context.request.method.as_str());
    }

    fn on_response(&self, response: &ResponseInfo, context: &RequestContext) {
        RequestMetrics::record_response(context.request.method.as_str(), response.status);
    }

    fn on_error(&self, error: &HttpError, context: &RequestContext) {
        RequestMetrics::record_error(context.request.method.as_str(), error.kind);
    }

    fn on_finally(&self, context: &RequestContext, outcome: Outcome) {
        let duration = context.elapsed(self.clock.now());
        RequestMetrics::record_duration(context.request.method.as_str(), outcome, duration);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platform_client_core::{Headers, Method, RequestSnapshot, Utc};
    use serde_json::Value;

    fn context() -> RequestContext {
        RequestContext {
            request_id: "req-1".to_string(),
            started_at: Utc::now(),
            request: RequestSnapshot {
                method: Method::Get,
                url: "/v1/tasks".to_string(),
                headers: Headers::new(),
                body: None,
                timeout: None,
            },
            show_global_loading: false,
        }
    }

    #[test]
    fn test_client_metrics_creation() {
        let metrics = ClientMetrics::new();
        assert!(metrics.handle().is_none());
        assert!(metrics.render().is_none());
    }

    #[test]
    fn test_client_metrics_install() {
        let mut metrics = ClientMetrics::new();
        // Handle might be None if another test already installed the recorder
        assert!(metrics.install().is_ok());
    }

    #[test]
    fn test_observer_records_full_lifecycle() {
        let mut metrics = ClientMetrics::new();
        metrics.install().unwrap();

        let observer = MetricsObserver::default();
        let ctx = context();
        observer.on_request(&ctx);
        observer.on_response(
            &ResponseInfo {
                status: 200,
                status_text: "OK".to_string(),
                headers: Headers::new(),
                url: ctx.request.url.clone(),
                data: Value::Null,
            },
            &ctx,
        );
        observer.on_error(&HttpError::timeout(), &ctx);
        observer.on_finally(&ctx, Outcome::Success);

        // Recorder may belong to another test in this process
        if let Some(rendered) = metrics.render() {
            assert!(rendered.contains("http_client_requests_total"));
            assert!(rendered.contains("http_client_responses_total"));
            assert!(rendered.contains("http_client_errors_total"));
            assert!(rendered.contains("http_client_request_duration_seconds"));
        }
    }
}
