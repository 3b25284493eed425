//! Response body decoding and envelope unwrapping.

use crate::headers::CONTENT_TYPE;
use crate::transport::TransportResponse;
use serde_json::Value;
use std::sync::Arc;

/// Transform applied to every successful payload before it reaches the caller
pub type UnwrapFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Default unwrap transform.
///
/// An object with a `data` field yields that field's value; anything else is
/// returned unchanged.
#[must_use]
pub fn unwrap_data_envelope(payload: Value) -> Value {
    match payload {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Identity transform, for clients that want the raw envelope
#[must_use]
pub const fn keep_envelope(payload: Value) -> Value {
    payload
}

/// Decode a raw response body into a JSON value.
///
/// - 204 and 205 responses, and empty bodies, decode to `null`.
/// - A JSON content type is parsed; unparseable JSON falls back to the raw
///   text instead of failing the call.
/// - Any other content is returned as a JSON string.
#[must_use]
pub fn decode_response_body(response: &TransportResponse) -> Value {
    if matches!(response.status, 204 | 205) || response.body.is_empty() {
        return Value::Null;
    }

    let text = String::from_utf8_lossy(&response.body);
    let is_json = response
        .headers
        .get(CONTENT_TYPE)
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"));

    if is_json {
        if let Ok(value) = serde_json::from_str(&text) {
            return value;
        }
    }
    Value::String(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::Headers;
    use bytes::Bytes;
    use proptest::prelude::*;
    use serde_json::json;

    fn response(status: u16, content_type: Option<&str>, body: &'static str) -> TransportResponse {
        let mut headers = Headers::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, ct);
        }
        TransportResponse {
            status,
            status_text: String::new(),
            headers,
            url: "https://api.example/v1/tasks".to_string(),
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    #[test]
    fn test_unwrap_extracts_data() {
        assert_eq!(unwrap_data_envelope(json!({"data": [1, 2], "code": 0})), json!([1, 2]));
        assert_eq!(unwrap_data_envelope(json!({"data": null})), Value::Null);
    }

    #[test]
    fn test_unwrap_leaves_other_payloads() {
        assert_eq!(unwrap_data_envelope(json!({"items": []})), json!({"items": []}));
        assert_eq!(unwrap_data_envelope(json!([{"data": 1}])), json!([{"data": 1}]));
        assert_eq!(unwrap_data_envelope(json!("data")), json!("data"));
    }

    #[test]
    fn test_no_content_is_null() {
        assert_eq!(decode_response_body(&response(204, Some("application/json"), "")), Value::Null);
        assert_eq!(decode_response_body(&response(205, None, "ignored")), Value::Null);
        assert_eq!(decode_response_body(&response(200, Some("application/json"), "")), Value::Null);
    }

    #[test]
    fn test_json_is_parsed() {
        let body = decode_response_body(&response(
            200,
            Some("Application/JSON; charset=utf-8"),
            r#"{"data":{"id":"t1"}}"#,
        ));
        assert_eq!(body, json!({"data": {"id": "t1"}}));
    }

    #[test]
    fn test_broken_json_falls_back_to_text() {
        let body = decode_response_body(&response(200, Some("application/json"), "{oops"));
        assert_eq!(body, json!("{oops"));
    }

    #[test]
    fn test_non_json_is_text() {
        let body = decode_response_body(&response(200, Some("text/plain"), r#"{"a":1}"#));
        assert_eq!(body, json!(r#"{"a":1}"#));
    }

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-z]{0,8}".prop_map(Value::from),
        ]
    }

    proptest! {
        #[test]
        fn prop_unwrap_is_idempotent_without_data(
            entries in proptest::collection::hash_map("[a-ce-z][a-z]{0,5}", leaf(), 0..6)
        ) {
            let payload = Value::Object(entries.into_iter().collect());
            let once = unwrap_data_envelope(payload.clone());
            let twice = unwrap_data_envelope(once.clone());
            prop_assert_eq!(&once, &payload);
            prop_assert_eq!(once, twice);
        }
    }
}
