//! Dedup keys for duplicate-request cancellation.

use crate::body::Method;

/// Key identifying "the same logical endpoint call".
///
/// Built from the lower-cased method, the resolved URL, and presence-only
/// markers for query parameters and body. Parameter and body *content* is not
/// part of the key: two POSTs to the same URL with different bodies collide.
///
/// ```
/// use platform_client_core::body::Method;
/// use platform_client_core::dedup::dedup_key;
///
/// assert_eq!(
///     dedup_key(Method::Post, "https://api.example/v1/search", false, true),
///     "post:https://api.example/v1/search?&[data]"
/// );
/// ```
#[must_use]
pub fn dedup_key(method: Method, url: &str, has_params: bool, has_body: bool) -> String {
    let params = if has_params { "[params]" } else { "" };
    let data = if has_body { "[data]" } else { "" };
    format!("{}:{url}?{params}&{data}", method.as_str().to_ascii_lowercase())
}
