//! Display text for failed calls.

use platform_client_core::HttpError;

/// Text to show for a failed call.
///
/// Prefers the `message` field of the response body, falling back to the
/// error's own message.
///
/// ```
/// use platform_client_core::HttpError;
/// use platform_client_state::error_message;
/// use serde_json::json;
///
/// let err = HttpError::status(401, "Unauthorized", json!({"message": "bad credentials"}));
/// assert_eq!(error_message(&err), "bad credentials");
/// ```
#[must_use]
pub fn error_message(error: &HttpError) -> String {
    error.body_message().unwrap_or_else(|| error.message.clone())
}
