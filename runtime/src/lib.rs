//! # Platform Client Runtime
//!
//! Runtime implementation of the platform service client.
//!
//! This crate provides the request pipeline that turns a
//! [`RequestDescriptor`](platform_client_core::RequestDescriptor) into a typed
//! result, and the collaborators it ships with.
//!
//! ## Core Components
//!
//! - **`HttpClient`**: id resolution, auth, dedup, timeout, cancellation, unwrapping, hooks
//! - **Pending Registry**: in-flight calls keyed for duplicate-cancellation
//! - **`ReqwestTransport`**: the production transport
//! - **Observers**: tracing logs, outcome stats, broadcast events, Prometheus metrics
//! - **`ClientConfig`**: environment-driven settings
//!
//! ## Example
//!
//! ```no_run
//! use platform_client_core::RequestDescriptor;
//! use platform_client_runtime::{ClientConfig, TracingObserver};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ClientConfig::from_env()?
//!     .into_builder()
//!     .observer(Arc::new(TracingObserver))
//!     .build();
//!
//! let captcha: serde_json::Value = client.request(RequestDescriptor::get("/v1/captchas")).await?;
//! # Ok(())
//! # }
//! ```

/// Request pipeline
pub mod client;

/// Environment-driven configuration
pub mod config;

/// Prometheus metrics for observability
pub mod metrics;

/// Built-in lifecycle observers
pub mod observers;

/// In-flight call registry for duplicate-cancellation
pub mod registry;

/// `reqwest` transport
pub mod reqwest_transport;

pub use client::{DEFAULT_TIMEOUT, HttpClient, HttpClientBuilder};
pub use config::{ClientConfig, ConfigError};
pub use metrics::{ClientMetrics, MetricsError, MetricsObserver};
pub use observers::{BroadcastObserver, LifecycleStats, StatsSnapshot, TracingObserver};
pub use registry::{PendingGuard, PendingRegistry};
pub use reqwest_transport::ReqwestTransport;
