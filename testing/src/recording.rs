//! Observer that captures every lifecycle notification.

use platform_client_core::{
    HttpError, LifecycleEvent, LifecycleObserver, Outcome, RequestContext, ResponseInfo,
};
use std::sync::{Mutex, PoisonError};

/// Records lifecycle events in the order they were delivered.
///
/// # Example
///
/// ```
/// use platform_client_testing::RecordingObserver;
///
/// let recorder = RecordingObserver::new();
/// assert!(recorder.events().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl RecordingObserver {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events so far
    #[must_use]
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.lock().clone()
    }

    /// Hook names delivered for one call, in order
    #[must_use]
    pub fn names_for(&self, request_id: &str) -> Vec<&'static str> {
        self.lock()
            .iter()
            .filter(|event| event.request_id() == request_id)
            .map(LifecycleEvent::name)
            .collect()
    }

    /// Distinct request ids, in order of first appearance
    #[must_use]
    pub fn request_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for event in self.lock().iter() {
            if !ids.iter().any(|id| id == event.request_id()) {
                ids.push(event.request_id().to_string());
            }
        }
        ids
    }

    /// Errors delivered through `on_error`
    #[must_use]
    pub fn errors(&self) -> Vec<HttpError> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                LifecycleEvent::Error { error, .. } => Some(error.clone()),
                _ => None,
            })
            .collect()
    }

    /// Forget everything recorded
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LifecycleEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, event: LifecycleEvent) {
        self.lock().push(event);
    }
}

impl LifecycleObserver for RecordingObserver {
    fn on_request(&self, context: &RequestContext) {
        self.push(LifecycleEvent::Request {
            context: context.clone(),
        });
    }

    fn on_response(&self, response: &ResponseInfo, context: &RequestContext) {
        self.push(LifecycleEvent::Response {
            response: response.clone(),
            context: context.clone(),
        });
    }

    fn on_error(&self, error: &HttpError, context: &RequestContext) {
        self.push(LifecycleEvent::Error {
            error: error.clone(),
            context: context.clone(),
        });
    }

    fn on_finally(&self, context: &RequestContext, outcome: Outcome) {
        self.push(LifecycleEvent::Finally {
            context: context.clone(),
            outcome,
        });
    }
}
