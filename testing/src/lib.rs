//! # Platform Client Testing
//!
//! Testing utilities and mocks for the platform service client.
//!
//! This crate provides:
//! - [`MockTransport`]: scripted replies, recorded requests, delays and hangs
//! - [`RecordingObserver`]: captures lifecycle events for ordering assertions
//! - Deterministic environment: [`FixedClock`], [`SequentialIdGenerator`]
//! - Property-based strategies for request inputs
//!
//! ## Example
//!
//! ```ignore
//! use platform_client_testing::{MockResponse, MockTransport, RecordingObserver};
//!
//! #[tokio::test]
//! async fn test_captcha() {
//!     let transport = Arc::new(MockTransport::new());
//!     transport.enqueue(Method::Get, "/v1/captchas", MockResponse::json(200, &json!({"data": {}})));
//!
//!     let client = HttpClient::builder()
//!         .base_url("https://api.example/")
//!         .transport(transport.clone())
//!         .build();
//!
//!     let captcha: Value = client.request(RequestDescriptor::get("/v1/captchas")).await.unwrap();
//!     assert_eq!(transport.request_count(), 1);
//! }
//! ```

use chrono::{DateTime, Utc};
use platform_client_core::environment::{Clock, IdGenerator};

pub mod mock_transport;
pub mod recording;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use platform_client_testing::mocks::FixedClock;
    /// use platform_client_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Predictable ids: `req-1`, `req-2`, ...
    #[derive(Debug, Default)]
    pub struct SequentialIdGenerator {
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Start at `req-1`
        #[must_use]
        pub const fn new() -> Self {
            Self {
                next: AtomicU64::new(0),
            }
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> String {
            format!("req-{}", self.next.fetch_add(1, Ordering::Relaxed) + 1)
        }
    }
}

/// Test helpers and utilities
pub mod helpers {
    use tracing_subscriber::EnvFilter;

    /// Install a `tracing` subscriber for test output.
    ///
    /// Honors `RUST_LOG`; safe to call from every test.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;

    /// Arbitrary caller-supplied path segment, including reserved characters
    pub fn path_segment() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 /?#%&=._~-]{1,24}"
    }

    /// Relative API path such as `/v1/tasks/abc`
    pub fn api_path() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-z0-9_-]{1,10}", 1..4).prop_map(|parts| format!("/{}", parts.join("/")))
    }
}

// Re-export commonly used items
pub use mock_transport::{MockResponse, MockTransport};
pub use mocks::{FixedClock, SequentialIdGenerator, test_clock};
pub use recording::RecordingObserver;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIdGenerator::new();
        assert_eq!(ids.next_id(), "req-1");
        assert_eq!(ids.next_id(), "req-2");
    }
}
