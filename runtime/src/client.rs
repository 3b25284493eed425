//! The request pipeline.
//!
//! [`HttpClient::request`] takes a [`RequestDescriptor`] through:
//!
//! 1. Identifier resolution and auth injection
//! 2. URL building and body preparation
//! 3. Duplicate-call registration (when enabled)
//! 4. `on_request`, then the transport raced against timeout and cancellation
//! 5. Response decoding, unwrapping, and conversion to the caller's type
//! 6. `on_response` or `on_error`, then `on_finally`
//!
//! Every dispatched call notifies observers exactly once with a terminal
//! outcome and exactly once with `on_finally`, in that order. A call whose
//! future is dropped after `on_request` settles as a caller cancellation.

use crate::reqwest_transport::ReqwestTransport;
use crate::registry::{PendingGuard, PendingRegistry};
use platform_client_core::dedup::dedup_key;
use platform_client_core::endpoint::build_url;
use platform_client_core::environment::{Clock, IdGenerator, SystemClock, UuidIdGenerator};
use platform_client_core::headers::{AUTHORIZATION, REQUEST_ID_ALIAS, REQUEST_ID_HEADER};
use platform_client_core::payload::decode_response_body;
use platform_client_core::{
    CancelReason, CancellationToken, Headers, Hooks, HttpError, LifecycleObserver, Outcome,
    RequestContext, RequestDescriptor, RequestSnapshot, ResponseInfo, TokenProvider, Transport,
    TransportRequest, TransportResponse, UnwrapFn, Value, unwrap_data_envelope,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::future;
use std::sync::Arc;
use std::time::Duration;

/// Timeout applied when neither the builder nor the request sets one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Builder for [`HttpClient`]
pub struct HttpClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    default_headers: Headers,
    token_provider: Option<Arc<dyn TokenProvider>>,
    cancel_duplicate: bool,
    unwrap: UnwrapFn,
    observers: Vec<Arc<dyn LifecycleObserver>>,
    transport: Option<Arc<dyn Transport>>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl HttpClientBuilder {
    /// Builder with default settings: no base URL, 10 s timeout, no auth,
    /// duplicate-cancellation off, `data`-envelope unwrapping, reqwest transport.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            default_headers: Headers::new(),
            token_provider: None,
            cancel_duplicate: false,
            unwrap: Arc::new(unwrap_data_envelope),
            observers: Vec::new(),
            transport: None,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidIdGenerator),
        }
    }

    /// Base URL prepended to relative request URLs
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Default per-request timeout; `Duration::ZERO` disables it
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Header sent with every request unless the request overrides it
    #[must_use]
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    /// Source of the bearer token
    #[must_use]
    pub fn token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    /// Cancel an in-flight call when an identical one is dispatched
    #[must_use]
    pub const fn cancel_duplicate(mut self, enabled: bool) -> Self {
        self.cancel_duplicate = enabled;
        self
    }

    /// Transform applied to successful payloads before conversion
    #[must_use]
    pub fn unwrap_with(mut self, transform: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.unwrap = Arc::new(transform);
        self
    }

    /// Add a lifecycle observer; observers are notified in insertion order
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Add closure hooks
    #[must_use]
    pub fn hooks(self, hooks: Hooks) -> Self {
        self.observer(Arc::new(hooks))
    }

    /// Replace the transport
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replace the clock used for start timestamps
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the request id generator
    #[must_use]
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Build the client
    #[must_use]
    pub fn build(self) -> HttpClient {
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::new()));

        HttpClient {
            inner: Arc::new(Inner {
                base_url: self.base_url,
                timeout: self.timeout,
                default_headers: self.default_headers,
                token_provider: self.token_provider,
                cancel_duplicate: self.cancel_duplicate,
                unwrap: self.unwrap,
                observers: self.observers,
                transport,
                clock: self.clock,
                ids: self.ids,
                registry: PendingRegistry::new(),
            }),
        }
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HttpClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClientBuilder")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("default_headers", &self.default_headers)
            .field("cancel_duplicate", &self.cancel_duplicate)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

struct Inner {
    base_url: Option<String>,
    timeout: Duration,
    default_headers: Headers,
    token_provider: Option<Arc<dyn TokenProvider>>,
    cancel_duplicate: bool,
    unwrap: UnwrapFn,
    observers: Vec<Arc<dyn LifecycleObserver>>,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    registry: Arc<PendingRegistry>,
}

/// A call ready for the transport
struct PreparedCall {
    context: RequestContext,
    transport_request: TransportRequest,
    timeout: Duration,
    cancel: Option<CancellationToken>,
    guard: Option<PendingGuard>,
}

/// Reports a dispatched call as cancelled if its future is dropped before
/// it settles
struct InFlight<'a> {
    observers: &'a [Arc<dyn LifecycleObserver>],
    context: &'a RequestContext,
    settled: bool,
}

impl InFlight<'_> {
    fn disarm(mut self) {
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        tracing::debug!(request_id = %self.context.request_id, "call dropped before settling");
        let error = HttpError::cancelled(CancelReason::Caller).with_request(self.context.request.clone());
        for observer in self.observers {
            observer.on_error(&error, self.context);
        }
        for observer in self.observers {
            observer.on_finally(self.context, Outcome::Error);
        }
    }
}

/// HTTP client running every call through the request pipeline.
///
/// Cheap to clone; clones share configuration and the pending registry.
///
/// # Example
///
/// ```no_run
/// use platform_client_core::RequestDescriptor;
/// use platform_client_runtime::HttpClient;
/// use serde_json::json;
///
/// # async fn example() -> Result<(), platform_client_core::HttpError> {
/// let client = HttpClient::builder().base_url("https://api.example/").build();
///
/// let tasks: Vec<serde_json::Value> = client
///     .request(RequestDescriptor::get("/v1/tasks").with_query(&json!({"status": "done"}))?)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<Inner>,
}

impl HttpClient {
    /// Start configuring a client
    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Client base URL, if configured
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.inner.base_url.as_deref()
    }

    /// Number of calls registered for duplicate-cancellation
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Dispatch a call and convert the unwrapped payload to `T`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] for network failures, timeouts, cancellation,
    /// non-success statuses, and payloads that do not convert to `T`
    pub async fn request<T: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> Result<T, HttpError> {
        self.execute(descriptor, |data| T::deserialize(data).map_err(|e| HttpError::decode(&e)))
            .await
    }

    /// Dispatch a call and return the unwrapped payload as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] for network failures, timeouts, cancellation,
    /// and non-success statuses
    pub async fn request_value(&self, descriptor: RequestDescriptor) -> Result<Value, HttpError> {
        self.execute(descriptor, |data| Ok(data.clone())).await
    }

    async fn execute<T, F>(&self, descriptor: RequestDescriptor, convert: F) -> Result<T, HttpError>
    where
        F: FnOnce(&Value) -> Result<T, HttpError>,
    {
        let PreparedCall {
            context,
            transport_request,
            timeout,
            cancel,
            guard,
        } = self.prepare(descriptor).await;

        for observer in &self.inner.observers {
            observer.on_request(&context);
        }
        let in_flight = InFlight {
            observers: &self.inner.observers,
            context: &context,
            settled: false,
        };

        let exchange = self
            .dispatch(transport_request, timeout, cancel.as_ref(), guard.as_ref())
            .await;
        drop(guard);

        let result = exchange.and_then(|response| self.settle(response, convert));
        in_flight.disarm();

        match result {
            Ok((value, response)) => {
                for observer in &self.inner.observers {
                    observer.on_response(&response, &context);
                }
                self.finish(&context, Outcome::Success);
                Ok(value)
            }
            Err(error) => {
                let error = error.with_request(context.request.clone());
                for observer in &self.inner.observers {
                    observer.on_error(&error, &context);
                }
                self.finish(&context, Outcome::Error);
                Err(error)
            }
        }
    }

    async fn prepare(&self, descriptor: RequestDescriptor) -> PreparedCall {
        let RequestDescriptor {
            method,
            url,
            base_url,
            params,
            body,
            headers: request_headers,
            request_id,
            timeout,
            cancel,
            show_global_loading,
        } = descriptor;

        let mut headers = self.inner.default_headers.clone();
        headers.extend_from(&request_headers);

        let alias = headers.remove(REQUEST_ID_ALIAS);
        let request_id = request_id
            .filter(|id| !id.is_empty())
            .or_else(|| headers.get(REQUEST_ID_HEADER).map(str::to_string))
            .or(alias)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.inner.ids.next_id());
        headers.insert(REQUEST_ID_HEADER, request_id.clone());

        // An explicit authorization header always wins over the provider
        let provider = self
            .inner
            .token_provider
            .as_ref()
            .filter(|_| !headers.contains(AUTHORIZATION));
        if let Some(provider) = provider {
            if let Some(token) = provider.token().await.filter(|t| !t.is_empty()) {
                headers.insert(AUTHORIZATION, format!("Bearer {token}"));
            }
        }

        let base = base_url.as_deref().or(self.inner.base_url.as_deref());
        let url = build_url(base, &url, params.as_ref());

        let guard = self.inner.cancel_duplicate.then(|| {
            let key = dedup_key(method, &url, params.is_some(), body.is_some());
            self.inner.registry.register(key)
        });

        let body = body.and_then(|body| body.prepare(method, &mut headers));
        let timeout = timeout.unwrap_or(self.inner.timeout);

        let request = RequestSnapshot {
            method,
            url: url.clone(),
            headers: headers.clone(),
            body: body.clone(),
            timeout: (!timeout.is_zero()).then_some(timeout),
        };

        PreparedCall {
            context: RequestContext {
                request_id,
                started_at: self.inner.clock.now(),
                request,
                show_global_loading,
            },
            transport_request: TransportRequest {
                method,
                url,
                headers,
                body,
            },
            timeout,
            cancel,
            guard,
        }
    }

    async fn dispatch(
        &self,
        request: TransportRequest,
        timeout: Duration,
        cancel: Option<&CancellationToken>,
        guard: Option<&PendingGuard>,
    ) -> Result<TransportResponse, HttpError> {
        let caller = async {
            match cancel {
                Some(token) => token.cancelled().await,
                None => future::pending::<()>().await,
            }
        };
        let superseded = async {
            match guard {
                Some(guard) => guard.token().cancelled().await,
                None => future::pending::<()>().await,
            }
        };
        let deadline = async {
            if timeout.is_zero() {
                future::pending::<()>().await;
            } else {
                tokio::time::sleep(timeout).await;
            }
        };

        tokio::select! {
            biased;
            () = caller => Err(HttpError::cancelled(CancelReason::Caller)),
            () = superseded => Err(HttpError::cancelled(CancelReason::Superseded)),
            () = deadline => Err(HttpError::timeout()),
            result = self.inner.transport.send(request) => {
                result.map_err(|e| HttpError::network(e.to_string()))
            }
        }
    }

    fn settle<T, F>(&self, response: TransportResponse, convert: F) -> Result<(T, ResponseInfo), HttpError>
    where
        F: FnOnce(&Value) -> Result<T, HttpError>,
    {
        let payload = decode_response_body(&response);
        if !response.is_success() {
            return Err(HttpError::status(response.status, &response.status_text, payload));
        }

        let data = (self.inner.unwrap)(payload);
        let value = match convert(&data) {
            Ok(value) => value,
            Err(error) => return Err(error.with_response(response.status, data)),
        };

        Ok((
            value,
            ResponseInfo {
                status: response.status,
                status_text: response.status_text,
                headers: response.headers,
                url: response.url,
                data,
            },
        ))
    }

    fn finish(&self, context: &RequestContext, outcome: Outcome) {
        for observer in &self.inner.observers {
            observer.on_finally(context, outcome);
        }
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.inner.base_url)
            .field("timeout", &self.inner.timeout)
            .field("cancel_duplicate", &self.inner.cancel_duplicate)
            .field("pending", &self.inner.registry.len())
            .finish_non_exhaustive()
    }
}
