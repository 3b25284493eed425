//! Auth-token providers.

use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;

/// Supplies the bearer token attached to outgoing requests.
///
/// Called once per dispatched call. Returning `None` or an empty string
/// leaves the request unauthenticated.
pub trait TokenProvider: Send + Sync {
    /// Fetch the current token
    fn token(&self) -> BoxFuture<'_, Option<String>>;
}

/// A token fixed at construction time
#[derive(Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    /// Wrap a token; `None` disables auth
    #[must_use]
    pub const fn new(token: Option<String>) -> Self {
        Self(token)
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StaticToken")
            .field(&self.0.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> BoxFuture<'_, Option<String>> {
        let token = self.0.clone();
        Box::pin(async move { token })
    }
}

/// Token provider backed by an async closure
pub struct FnTokenProvider<F>(F);

impl<F> fmt::Debug for FnTokenProvider<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnTokenProvider")
    }
}

/// Build a provider from a closure returning a future.
///
/// ```
/// use platform_client_core::auth::{token_fn, TokenProvider};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let provider = token_fn(|| async { Some("t0k3n".to_string()) });
/// assert_eq!(provider.token().await.as_deref(), Some("t0k3n"));
/// # });
/// ```
pub const fn token_fn<F, Fut>(f: F) -> FnTokenProvider<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Option<String>> + Send + 'static,
{
    FnTokenProvider(f)
}

impl<F, Fut> TokenProvider for FnTokenProvider<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Option<String>> + Send + 'static,
{
    fn token(&self) -> BoxFuture<'_, Option<String>> {
        Box::pin((self.0)())
    }
}
