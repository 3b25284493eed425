//! Global loading indicator.

use platform_client_core::environment::{Clock, SystemClock};
use platform_client_core::{LifecycleObserver, Outcome, RequestContext};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Counts in-flight calls that asked for the global loading indicator.
///
/// Register it as an observer on the client; calls without
/// `show_global_loading` are ignored.
pub struct GlobalLoading {
    pending: AtomicUsize,
    last_duration: Mutex<Option<Duration>>,
    clock: Arc<dyn Clock>,
}

impl GlobalLoading {
    /// Counter timed by the system clock
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Counter timed by `clock`
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            pending: AtomicUsize::new(0),
            last_duration: Mutex::new(None),
            clock,
        }
    }

    /// Whether any flagged call is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.pending() > 0
    }

    /// Flagged calls in flight
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Duration of the most recently settled flagged call
    #[must_use]
    pub fn last_duration(&self) -> Option<Duration> {
        *self.last_duration.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for GlobalLoading {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GlobalLoading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalLoading")
            .field("pending", &self.pending())
            .field("last_duration", &self.last_duration())
            .finish_non_exhaustive()
    }
}

impl LifecycleObserver for GlobalLoading {
    fn on_request(&self, context: &RequestContext) {
        if context.show_global_loading {
            self.pending.fetch_add(1, Ordering::AcqRel);
        }
    }

    fn on_finally(&self, context: &RequestContext, _outcome: Outcome) {
        if !context.show_global_loading {
            return;
        }
        *self.last_duration.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(context.elapsed(self.clock.now()));
        // Saturating: a finally without a matching request must not wrap.
        let _ = self
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| Some(n.saturating_sub(1)));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platform_client_core::{Headers, Method, RequestSnapshot};
    use platform_client_testing::{FixedClock, test_clock};

    fn context(show: bool) -> RequestContext {
        RequestContext {
            request_id: "req-1".to_string(),
            started_at: test_clock().now(),
            request: RequestSnapshot {
                method: Method::Get,
                url: "https://api.example/v1/tasks".to_string(),
                headers: Headers::new(),
                body: None,
                timeout: None,
            },
            show_global_loading: show,
        }
    }

    #[test]
    fn test_counts_only_flagged_calls() {
        let later = test_clock().now() + chrono::Duration::milliseconds(250);
        let loading = GlobalLoading::with_clock(Arc::new(FixedClock::new(later)));

        loading.on_request(&context(false));
        assert!(!loading.is_loading());

        loading.on_request(&context(true));
        loading.on_request(&context(true));
        assert_eq!(loading.pending(), 2);

        loading.on_finally(&context(true), Outcome::Success);
        loading.on_finally(&context(true), Outcome::Error);
        assert_eq!(loading.pending(), 0);
        assert_eq!(loading.last_duration(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_unmatched_finally_saturates() {
        let loading = GlobalLoading::with_clock(Arc::new(test_clock()));
        loading.on_finally(&context(true), Outcome::Error);
        assert_eq!(loading.pending(), 0);
        assert_eq!(loading.last_duration(), Some(Duration::ZERO));
    }
}
