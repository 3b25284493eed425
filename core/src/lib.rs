//! # Platform Client Core
//!
//! Core types and traits for the platform service client.
//!
//! This crate defines everything the request pipeline exchanges with its
//! callers and collaborators, without performing any I/O itself.
//!
//! ## Core Concepts
//!
//! - **Request Descriptor**: one logical HTTP call (method, URL, query, body, headers, id, timeout, cancellation)
//! - **Request Body**: closed set of body kinds, each with a fixed pass-through or serialization rule
//! - **Request Context**: identity and timing of a dispatched call, shared by all its hooks
//! - **Normalized Error**: the single error shape for every failure mode
//! - **Lifecycle Observer**: request → (response | error) → finally notifications
//! - **Transport**: the "perform one HTTP exchange" boundary
//! - **Environment**: injected clock, id generator, and token provider
//!
//! ## Example
//!
//! ```
//! use platform_client_core::descriptor::RequestDescriptor;
//! use platform_client_core::endpoint::build_url;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), platform_client_core::error::HttpError> {
//! let request = RequestDescriptor::get("/v1/tasks").with_query(&json!({"status": "done"}))?;
//! let url = build_url(Some("https://api.example/"), &request.url, request.params.as_ref());
//! assert_eq!(url, "https://api.example/v1/tasks?status=done");
//! # Ok(())
//! # }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde_json::Value;
pub use tokio_util::sync::CancellationToken;

pub mod auth;
pub mod body;
pub mod context;
pub mod dedup;
pub mod descriptor;
pub mod endpoint;
pub mod error;
pub mod headers;
pub mod observer;
pub mod payload;
pub mod transport;

pub use auth::{StaticToken, TokenProvider, token_fn};
pub use body::{Method, MultipartForm, PreparedBody, RequestBody};
pub use context::{Outcome, RequestContext, RequestSnapshot, ResponseInfo};
pub use descriptor::RequestDescriptor;
pub use endpoint::QueryParams;
pub use error::{CancelReason, HttpError, HttpErrorKind};
pub use headers::Headers;
pub use observer::{Hooks, LifecycleEvent, LifecycleObserver};
pub use payload::{UnwrapFn, unwrap_data_envelope};
pub use transport::{Transport, TransportError, TransportRequest, TransportResponse};

/// Environment module - Dependency injection traits
///
/// Time and identifier generation are abstracted behind traits so the
/// pipeline can be driven deterministically in tests.
pub mod environment {
    use chrono::{DateTime, Utc};
    use rand::Rng;

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Generates request identifiers
    ///
    /// Identifiers must be unique across concurrent calls of one client.
    pub trait IdGenerator: Send + Sync {
        /// Produce a fresh identifier
        fn next_id(&self) -> String;
    }

    /// Random UUID v4 identifiers (the default)
    #[derive(Debug, Clone, Copy, Default)]
    pub struct UuidIdGenerator;

    impl IdGenerator for UuidIdGenerator {
        fn next_id(&self) -> String {
            uuid::Uuid::new_v4().to_string()
        }
    }

    /// `{unix millis}-{random hex}` identifiers.
    ///
    /// For environments that want ids sortable by creation time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct TimestampIdGenerator;

    impl IdGenerator for TimestampIdGenerator {
        fn next_id(&self) -> String {
            let suffix: u64 = rand::thread_rng().r#gen();
            format!("{}-{suffix:x}", Utc::now().timestamp_millis())
        }
    }
}
